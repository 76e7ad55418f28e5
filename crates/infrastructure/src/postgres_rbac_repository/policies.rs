use crate::postgres_support::{is_foreign_key_violation, storage_error};

use super::*;

impl PostgresRbacRepository {
    pub(super) async fn insert_policy_impl(&self, policy: Policy) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO policies (id, name, description, tenant_id, is_system, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(policy.id.as_uuid())
        .bind(policy.name.as_str())
        .bind(policy.description.as_deref())
        .bind(policy.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(policy.is_system)
        .bind(policy.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to insert policy", error))?;

        Ok(())
    }

    pub(super) async fn find_policy_impl(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT id, name, description, tenant_id, is_system, created_at
            FROM policies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load policy", error))?;

        Ok(row.map(PolicyRow::into_policy))
    }

    pub(super) async fn list_policies_impl(
        &self,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<Policy>> {
        let rows = match tenant_id {
            Some(tenant_id) => {
                sqlx::query_as::<_, PolicyRow>(
                    r#"
                    SELECT id, name, description, tenant_id, is_system, created_at
                    FROM policies
                    WHERE tenant_id = $1 OR tenant_id IS NULL
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, PolicyRow>(
                    r#"
                    SELECT id, name, description, tenant_id, is_system, created_at
                    FROM policies
                    WHERE is_system = true
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| storage_error("failed to list policies", error))?;

        Ok(rows.into_iter().map(PolicyRow::into_policy).collect())
    }

    pub(super) async fn update_policy_impl(&self, policy: Policy) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE policies
            SET name = $2, description = $3
            WHERE id = $1
            "#,
        )
        .bind(policy.id.as_uuid())
        .bind(policy.name.as_str())
        .bind(policy.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to update policy", error))?;

        Ok(())
    }

    pub(super) async fn delete_policy_impl(&self, id: PolicyId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    return AppError::ReferentialIntegrity(format!(
                        "cannot delete policy '{id}': still assigned to roles"
                    ));
                }

                storage_error("failed to delete policy", error)
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("policy '{id}' was not found")));
        }

        Ok(())
    }

    pub(super) async fn count_roles_with_policy_impl(&self, id: PolicyId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM role_policies WHERE policy_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| storage_error("failed to count policy references", error))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(super) async fn assign_permissions_to_policy_impl(
        &self,
        policy_id: PolicyId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error("failed to begin transaction", error))?;

        // The whole batch is validated before the first insert; an early
        // return rolls the transaction back.
        for permission_id in permission_ids {
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM permissions WHERE id = $1",
            )
            .bind(permission_id.as_uuid())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| storage_error("failed to verify permission", error))?;

            if exists == 0 {
                return Err(AppError::NotFound(format!(
                    "permission '{permission_id}' was not found"
                )));
            }
        }

        for permission_id in permission_ids {
            sqlx::query(
                r#"
                INSERT INTO policy_permissions (policy_id, permission_id)
                VALUES ($1, $2)
                ON CONFLICT (policy_id, permission_id) DO NOTHING
                "#,
            )
            .bind(policy_id.as_uuid())
            .bind(permission_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error("failed to assign permission", error))?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| storage_error("failed to commit transaction", error))
    }

    pub(super) async fn revoke_permission_from_policy_impl(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM policy_permissions WHERE policy_id = $1 AND permission_id = $2",
        )
        .bind(policy_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to revoke permission", error))?;

        Ok(())
    }

    pub(super) async fn policy_permissions_impl(
        &self,
        policy_id: PolicyId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT DISTINCT permissions.service, permissions.entity, permissions.action
            FROM permissions
            INNER JOIN policy_permissions
                ON policy_permissions.permission_id = permissions.id
            WHERE policy_permissions.policy_id = $1
            "#,
        )
        .bind(policy_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load policy permissions", error))?;

        rows.into_iter().map(PermissionKeyRow::into_key).collect()
    }
}
