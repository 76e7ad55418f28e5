use std::collections::{BTreeSet, HashMap};

use tokio::sync::RwLock;

use warden_core::{PermissionId, PolicyId, RoleId, TenantId};
use warden_domain::{Permission, PermissionKey, PlatformAdmin, Policy, Role, TenantMembership};

/// Shared in-process tables, the in-memory analogue of a connection pool.
///
/// Multi-table mutations take locks in declaration order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) permissions: RwLock<HashMap<PermissionId, Permission>>,
    pub(crate) policies: RwLock<HashMap<PolicyId, Policy>>,
    pub(crate) roles: RwLock<HashMap<RoleId, Role>>,
    pub(crate) policy_permissions: RwLock<BTreeSet<(PolicyId, PermissionId)>>,
    pub(crate) role_policies: RwLock<BTreeSet<(RoleId, PolicyId)>>,
    pub(crate) memberships: RwLock<HashMap<(TenantId, String), TenantMembership>>,
    pub(crate) platform_admins: RwLock<Vec<PlatformAdmin>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the transitive permission union for a role across both join
    /// tables.
    pub(crate) async fn effective_permissions_for_role(
        &self,
        role_id: RoleId,
    ) -> BTreeSet<PermissionKey> {
        let permissions = self.permissions.read().await;
        let policy_permissions = self.policy_permissions.read().await;
        let role_policies = self.role_policies.read().await;

        role_policies
            .iter()
            .filter(|(stored_role_id, _)| *stored_role_id == role_id)
            .flat_map(|(_, policy_id)| {
                policy_permissions
                    .iter()
                    .filter(|(stored_policy_id, _)| stored_policy_id == policy_id)
                    .filter_map(|(_, permission_id)| {
                        permissions
                            .get(permission_id)
                            .map(|permission| permission.key.clone())
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
