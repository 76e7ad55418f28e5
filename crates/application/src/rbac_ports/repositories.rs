use std::collections::BTreeSet;

use async_trait::async_trait;
use warden_core::{AppResult, PermissionId, PolicyId, RoleId, TenantId};
use warden_domain::{Permission, PermissionKey, PlatformAdmin, Policy, Role, TenantMembership};

/// Repository port for the permission catalog and the policy/role graph.
#[async_trait]
pub trait RbacRepository: Send + Sync {
    /// Persists a new catalog permission; fails with `Conflict` when the key
    /// is already taken.
    async fn insert_permission(&self, permission: Permission) -> AppResult<()>;

    /// Finds a permission by id.
    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds a permission by its unique key.
    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>>;

    /// Lists catalog permissions sorted by key, optionally filtered by service.
    async fn list_permissions(&self, service: Option<&str>) -> AppResult<Vec<Permission>>;

    /// Deletes a permission; fails with `NotFound` when absent.
    async fn delete_permission(&self, id: PermissionId) -> AppResult<()>;

    /// Counts policies holding an assignment of this permission.
    async fn count_policies_with_permission(&self, id: PermissionId) -> AppResult<u64>;

    /// Persists a new policy.
    async fn insert_policy(&self, policy: Policy) -> AppResult<()>;

    /// Finds a policy by id.
    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>>;

    /// Lists policies sorted by name. With a tenant filter, returns that
    /// tenant's policies plus system policies; without, system policies only.
    async fn list_policies(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Policy>>;

    /// Persists changes to an existing policy.
    async fn update_policy(&self, policy: Policy) -> AppResult<()>;

    /// Deletes a policy and its permission assignments; fails with `NotFound`
    /// when absent.
    async fn delete_policy(&self, id: PolicyId) -> AppResult<()>;

    /// Counts roles holding an assignment of this policy.
    async fn count_roles_with_policy(&self, id: PolicyId) -> AppResult<u64>;

    /// Atomically assigns permissions to a policy. Pairs already assigned are
    /// ignored; any unknown permission id aborts the whole batch with
    /// `NotFound` and leaves the join table untouched.
    async fn assign_permissions_to_policy(
        &self,
        policy_id: PolicyId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Removes one permission assignment; removing an absent pair succeeds.
    async fn revoke_permission_from_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Returns the de-duplicated set of permission keys directly assigned to
    /// a policy.
    async fn policy_permissions(&self, policy_id: PolicyId) -> AppResult<BTreeSet<PermissionKey>>;

    /// Persists a new role.
    async fn insert_role(&self, role: Role) -> AppResult<()>;

    /// Finds a role by id.
    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Lists roles sorted by name. With a tenant filter, returns that
    /// tenant's roles plus system roles; without, system roles only.
    async fn list_roles(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Role>>;

    /// Persists changes to an existing role.
    async fn update_role(&self, role: Role) -> AppResult<()>;

    /// Deletes a role and its policy assignments; fails with `NotFound` when
    /// absent.
    async fn delete_role(&self, id: RoleId) -> AppResult<()>;

    /// Counts memberships currently holding this role.
    async fn count_memberships_with_role(&self, id: RoleId) -> AppResult<u64>;

    /// Atomically assigns policies to a role with the same batch contract as
    /// [`RbacRepository::assign_permissions_to_policy`].
    async fn assign_policies_to_role(
        &self,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()>;

    /// Removes one policy assignment; removing an absent pair succeeds.
    async fn revoke_policy_from_role(&self, role_id: RoleId, policy_id: PolicyId)
    -> AppResult<()>;

    /// Lists policies assigned to a role, sorted by name.
    async fn role_policies(&self, role_id: RoleId) -> AppResult<Vec<Policy>>;

    /// Returns the transitive, de-duplicated union of permission keys
    /// reachable from a role through its policies.
    async fn role_effective_permissions(&self, role_id: RoleId)
    -> AppResult<BTreeSet<PermissionKey>>;
}

/// Repository port for tenant membership rows.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Persists a new membership; fails with `Conflict` when the
    /// `(tenant, user)` pair already exists.
    async fn insert_membership(&self, membership: TenantMembership) -> AppResult<()>;

    /// Finds the membership binding a user to a tenant.
    async fn find_membership(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<TenantMembership>>;

    /// Lists tenant members sorted by user id.
    async fn list_memberships(&self, tenant_id: TenantId) -> AppResult<Vec<TenantMembership>>;

    /// Persists changes to an existing membership.
    async fn update_membership(&self, membership: TenantMembership) -> AppResult<()>;

    /// Deletes a membership; fails with `NotFound` when absent.
    async fn delete_membership(&self, tenant_id: TenantId, user_id: &str) -> AppResult<()>;
}

/// Repository port for the platform administrator registry.
#[async_trait]
pub trait PlatformAdminRepository: Send + Sync {
    /// Persists a new registry entry; fails with `Conflict` when the user is
    /// already registered.
    async fn insert_admin(&self, admin: PlatformAdmin) -> AppResult<()>;

    /// Finds a registry entry by user id.
    async fn find_admin(&self, user_id: &str) -> AppResult<Option<PlatformAdmin>>;

    /// Lists registry entries sorted by creation time, newest first.
    async fn list_admins(&self) -> AppResult<Vec<PlatformAdmin>>;

    /// Deletes a registry entry. Refuses to remove the final entry with
    /// `Conflict`, atomically with the removal itself.
    async fn delete_admin(&self, user_id: &str) -> AppResult<()>;

    /// Returns whether the user holds a registry entry.
    async fn is_platform_admin(&self, user_id: &str) -> AppResult<bool>;
}

/// Read-side port consumed by the authorization resolver.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds the membership binding a user to a tenant.
    async fn find_membership(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<TenantMembership>>;

    /// Returns the transitive, de-duplicated union of permission keys
    /// reachable from a role through its policies.
    async fn role_effective_permissions(&self, role_id: RoleId)
    -> AppResult<BTreeSet<PermissionKey>>;
}
