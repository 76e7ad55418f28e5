use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use warden_application::MembershipRepository;
use warden_core::{AppError, AppResult, RoleId, TenantId};
use warden_domain::{MembershipStatus, TenantMembership};

use crate::postgres_support::{is_unique_violation, storage_error};

/// PostgreSQL-backed repository for tenant membership rows.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    tenant_id: Uuid,
    user_id: String,
    role_id: Uuid,
    status: String,
    invited_by: Option<String>,
    joined_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> AppResult<TenantMembership> {
        let status = MembershipStatus::from_str(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "stored membership for user '{}' has invalid status: {error}",
                self.user_id
            ))
        })?;

        Ok(TenantMembership {
            tenant_id: TenantId::from_uuid(self.tenant_id),
            user_id: self.user_id,
            role_id: RoleId::from_uuid(self.role_id),
            status,
            invited_by: self.invited_by,
            joined_at: self.joined_at,
        })
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn insert_membership(&self, membership: TenantMembership) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tenant_memberships
                (tenant_id, user_id, role_id, status, invited_by, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(membership.tenant_id.as_uuid())
        .bind(membership.user_id.as_str())
        .bind(membership.role_id.as_uuid())
        .bind(membership.status.as_str())
        .bind(membership.invited_by.as_deref())
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "user '{}' is already a member of tenant '{}'",
                    membership.user_id, membership.tenant_id
                ));
            }

            storage_error("failed to insert membership", error)
        })?;

        Ok(())
    }

    async fn find_membership(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<TenantMembership>> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT tenant_id, user_id, role_id, status, invited_by, joined_at
            FROM tenant_memberships
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("failed to load membership", error))?
        .map(MembershipRow::into_membership)
        .transpose()
    }

    async fn list_memberships(&self, tenant_id: TenantId) -> AppResult<Vec<TenantMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT tenant_id, user_id, role_id, status, invited_by, joined_at
            FROM tenant_memberships
            WHERE tenant_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("failed to list memberships", error))?;

        rows.into_iter().map(MembershipRow::into_membership).collect()
    }

    async fn update_membership(&self, membership: TenantMembership) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tenant_memberships
            SET role_id = $3, status = $4
            WHERE tenant_id = $1 AND user_id = $2
            "#,
        )
        .bind(membership.tenant_id.as_uuid())
        .bind(membership.user_id.as_str())
        .bind(membership.role_id.as_uuid())
        .bind(membership.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to update membership", error))?;

        Ok(())
    }

    async fn delete_membership(&self, tenant_id: TenantId, user_id: &str) -> AppResult<()> {
        let rows_affected = sqlx::query(
            "DELETE FROM tenant_memberships WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|error| storage_error("failed to delete membership", error))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of tenant '{tenant_id}'"
            )));
        }

        Ok(())
    }
}
