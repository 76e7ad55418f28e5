use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use warden_application::RbacRepository;
use warden_core::{AppError, AppResult, PermissionId, PolicyId, RoleId, TenantId};
use warden_domain::{Permission, PermissionKey, Policy, Role, RoleKind};

mod permissions;
mod policies;
mod roles;

/// PostgreSQL-backed repository for the permission catalog and the
/// policy/role graph.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    service: String,
    entity: String,
    action: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_permission(self) -> AppResult<Permission> {
        let key =
            PermissionKey::new(self.service, self.entity, self.action).map_err(|error| {
                AppError::Internal(format!(
                    "stored permission '{}' failed key validation: {error}",
                    self.id
                ))
            })?;

        Ok(Permission {
            id: PermissionId::from_uuid(self.id),
            key,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PolicyRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    tenant_id: Option<Uuid>,
    is_system: bool,
    created_at: DateTime<Utc>,
}

impl PolicyRow {
    fn into_policy(self) -> Policy {
        Policy {
            id: PolicyId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            tenant_id: self.tenant_id.map(TenantId::from_uuid),
            is_system: self.is_system,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    kind: String,
    description: Option<String>,
    tenant_id: Option<Uuid>,
    is_system: bool,
    created_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        let kind = RoleKind::from_str(self.kind.as_str()).map_err(|error| {
            AppError::Internal(format!("stored role '{}' has invalid kind: {error}", self.id))
        })?;

        Ok(Role {
            id: RoleId::from_uuid(self.id),
            name: self.name,
            kind,
            description: self.description,
            tenant_id: self.tenant_id.map(TenantId::from_uuid),
            is_system: self.is_system,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PermissionKeyRow {
    service: String,
    entity: String,
    action: String,
}

impl PermissionKeyRow {
    fn into_key(self) -> AppResult<PermissionKey> {
        PermissionKey::new(self.service, self.entity, self.action)
            .map_err(|error| AppError::Internal(format!("stored permission key invalid: {error}")))
    }
}

#[async_trait]
impl RbacRepository for PostgresRbacRepository {
    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        self.insert_permission_impl(permission).await
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        self.find_permission_impl(id).await
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        self.find_permission_by_key_impl(key).await
    }

    async fn list_permissions(&self, service: Option<&str>) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl(service).await
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<()> {
        self.delete_permission_impl(id).await
    }

    async fn count_policies_with_permission(&self, id: PermissionId) -> AppResult<u64> {
        self.count_policies_with_permission_impl(id).await
    }

    async fn insert_policy(&self, policy: Policy) -> AppResult<()> {
        self.insert_policy_impl(policy).await
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        self.find_policy_impl(id).await
    }

    async fn list_policies(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Policy>> {
        self.list_policies_impl(tenant_id).await
    }

    async fn update_policy(&self, policy: Policy) -> AppResult<()> {
        self.update_policy_impl(policy).await
    }

    async fn delete_policy(&self, id: PolicyId) -> AppResult<()> {
        self.delete_policy_impl(id).await
    }

    async fn count_roles_with_policy(&self, id: PolicyId) -> AppResult<u64> {
        self.count_roles_with_policy_impl(id).await
    }

    async fn assign_permissions_to_policy(
        &self,
        policy_id: PolicyId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.assign_permissions_to_policy_impl(policy_id, permission_ids)
            .await
    }

    async fn revoke_permission_from_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.revoke_permission_from_policy_impl(policy_id, permission_id)
            .await
    }

    async fn policy_permissions(&self, policy_id: PolicyId) -> AppResult<BTreeSet<PermissionKey>> {
        self.policy_permissions_impl(policy_id).await
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        self.insert_role_impl(role).await
    }

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
        self.find_role_impl(id).await
    }

    async fn list_roles(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Role>> {
        self.list_roles_impl(tenant_id).await
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        self.update_role_impl(role).await
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        self.delete_role_impl(id).await
    }

    async fn count_memberships_with_role(&self, id: RoleId) -> AppResult<u64> {
        self.count_memberships_with_role_impl(id).await
    }

    async fn assign_policies_to_role(
        &self,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()> {
        self.assign_policies_to_role_impl(role_id, policy_ids).await
    }

    async fn revoke_policy_from_role(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        self.revoke_policy_from_role_impl(role_id, policy_id).await
    }

    async fn role_policies(&self, role_id: RoleId) -> AppResult<Vec<Policy>> {
        self.role_policies_impl(role_id).await
    }

    async fn role_effective_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        self.role_effective_permissions_impl(role_id).await
    }
}
