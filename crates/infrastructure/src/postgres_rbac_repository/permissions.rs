use crate::postgres_support::{is_foreign_key_violation, is_unique_violation, storage_error};

use super::*;

impl PostgresRbacRepository {
    pub(super) async fn insert_permission_impl(&self, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permissions (id, service, entity, action, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(permission.id.as_uuid())
        .bind(permission.key.service())
        .bind(permission.key.entity())
        .bind(permission.key.action())
        .bind(permission.description.as_deref())
        .bind(permission.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "permission '{}' already exists",
                    permission.key
                ));
            }

            storage_error("failed to insert permission", error)
        })?;

        Ok(())
    }

    pub(super) async fn find_permission_impl(
        &self,
        id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, service, entity, action, description, created_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load permission", error))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    pub(super) async fn find_permission_by_key_impl(
        &self,
        key: &PermissionKey,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, service, entity, action, description, created_at
            FROM permissions
            WHERE service = $1 AND entity = $2 AND action = $3
            "#,
        )
        .bind(key.service())
        .bind(key.entity())
        .bind(key.action())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load permission by key", error))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    pub(super) async fn list_permissions_impl(
        &self,
        service: Option<&str>,
    ) -> AppResult<Vec<Permission>> {
        let rows = match service {
            Some(service) => {
                sqlx::query_as::<_, PermissionRow>(
                    r#"
                    SELECT id, service, entity, action, description, created_at
                    FROM permissions
                    WHERE service = $1
                    ORDER BY service, entity, action
                    "#,
                )
                .bind(service)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, PermissionRow>(
                    r#"
                    SELECT id, service, entity, action, description, created_at
                    FROM permissions
                    ORDER BY service, entity, action
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| storage_error("failed to list permissions", error))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }

    pub(super) async fn delete_permission_impl(&self, id: PermissionId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    return AppError::ReferentialIntegrity(format!(
                        "cannot delete permission '{id}': still assigned to policies"
                    ));
                }

                storage_error("failed to delete permission", error)
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{id}' was not found"
            )));
        }

        Ok(())
    }

    pub(super) async fn count_policies_with_permission_impl(
        &self,
        id: PermissionId,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM policy_permissions WHERE permission_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| storage_error("failed to count permission references", error))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
