use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use warden_application::AuthorizationRepository;
use warden_core::{AppError, AppResult, RoleId, TenantId};
use warden_domain::{MembershipStatus, PermissionKey, TenantMembership};

use crate::postgres_support::storage_error;

/// PostgreSQL-backed read-side repository for the authorization resolver.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
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

#[derive(Debug, FromRow)]
struct PermissionKeyRow {
    service: String,
    entity: String,
    action: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_membership(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<TenantMembership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
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
        .map_err(|error| storage_error("failed to load membership", error))?;

        row.map(|row| {
            let status = MembershipStatus::from_str(row.status.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "stored membership for user '{}' has invalid status: {error}",
                    row.user_id
                ))
            })?;

            Ok(TenantMembership {
                tenant_id: TenantId::from_uuid(row.tenant_id),
                user_id: row.user_id,
                role_id: RoleId::from_uuid(row.role_id),
                status,
                invited_by: row.invited_by,
                joined_at: row.joined_at,
            })
        })
        .transpose()
    }

    async fn role_effective_permissions(
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

        rows.into_iter()
            .map(|row| {
                PermissionKey::new(row.service, row.entity, row.action).map_err(|error| {
                    AppError::Internal(format!("stored permission key invalid: {error}"))
                })
            })
            .collect()
    }
}
