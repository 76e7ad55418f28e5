use crate::postgres_support::{is_foreign_key_violation, storage_error};

use super::*;

impl PostgresRbacRepository {
    pub(super) async fn insert_role_impl(&self, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, kind, description, tenant_id, is_system, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.kind.as_str())
        .bind(role.description.as_deref())
        .bind(role.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(role.is_system)
        .bind(role.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to insert role", error))?;

        Ok(())
    }

    pub(super) async fn find_role_impl(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, kind, description, tenant_id, is_system, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load role", error))?
        .map(RoleRow::into_role)
        .transpose()
    }

    pub(super) async fn list_roles_impl(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Role>> {
        let rows = match tenant_id {
            Some(tenant_id) => {
                sqlx::query_as::<_, RoleRow>(
                    r#"
                    SELECT id, name, kind, description, tenant_id, is_system, created_at
                    FROM roles
                    WHERE tenant_id = $1 OR tenant_id IS NULL
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RoleRow>(
                    r#"
                    SELECT id, name, kind, description, tenant_id, is_system, created_at
                    FROM roles
                    WHERE is_system = true
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| storage_error("failed to list roles", error))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    pub(super) async fn update_role_impl(&self, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3
            WHERE id = $1
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to update role", error))?;

        Ok(())
    }

    pub(super) async fn delete_role_impl(&self, id: RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    return AppError::ReferentialIntegrity(format!(
                        "cannot delete role '{id}': still held by memberships"
                    ));
                }

                storage_error("failed to delete role", error)
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{id}' was not found")));
        }

        Ok(())
    }

    pub(super) async fn count_memberships_with_role_impl(&self, id: RoleId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tenant_memberships WHERE role_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| storage_error("failed to count role references", error))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(super) async fn assign_policies_to_role_impl(
        &self,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error("failed to begin transaction", error))?;

        for policy_id in policy_ids {
            let exists =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM policies WHERE id = $1")
                    .bind(policy_id.as_uuid())
                    .fetch_one(&mut *transaction)
                    .await
                    .map_err(|error| storage_error("failed to verify policy", error))?;

            if exists == 0 {
                return Err(AppError::NotFound(format!(
                    "policy '{policy_id}' was not found"
                )));
            }
        }

        for policy_id in policy_ids {
            sqlx::query(
                r#"
                INSERT INTO role_policies (role_id, policy_id)
                VALUES ($1, $2)
                ON CONFLICT (role_id, policy_id) DO NOTHING
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(policy_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error("failed to assign policy", error))?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| storage_error("failed to commit transaction", error))
    }

    pub(super) async fn revoke_policy_from_role_impl(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM role_policies WHERE role_id = $1 AND policy_id = $2")
            .bind(role_id.as_uuid())
            .bind(policy_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("failed to revoke policy", error))?;

        Ok(())
    }

    pub(super) async fn role_policies_impl(&self, role_id: RoleId) -> AppResult<Vec<Policy>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT policies.id, policies.name, policies.description,
                   policies.tenant_id, policies.is_system, policies.created_at
            FROM policies
            INNER JOIN role_policies
                ON role_policies.policy_id = policies.id
            WHERE role_policies.role_id = $1
            ORDER BY policies.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load role policies", error))?;

        Ok(rows.into_iter().map(PolicyRow::into_policy).collect())
    }

    pub(super) async fn role_effective_permissions_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT DISTINCT permissions.service, permissions.entity, permissions.action
            FROM permissions
            INNER JOIN policy_permissions
                ON policy_permissions.permission_id = permissions.id
            INNER JOIN role_policies
                ON role_policies.policy_id = policy_permissions.policy_id
            WHERE role_policies.role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load effective permissions", error))?;

        rows.into_iter().map(PermissionKeyRow::into_key).collect()
    }
}
