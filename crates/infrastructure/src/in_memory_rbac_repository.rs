use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use warden_application::RbacRepository;
use warden_core::{AppError, AppResult, PermissionId, PolicyId, RoleId, TenantId};
use warden_domain::{Permission, PermissionKey, Policy, Role};

use crate::InMemoryStore;


/// In-memory repository for the permission catalog and the policy/role
/// graph, used by tests and local development.
#[derive(Clone)]
pub struct InMemoryRbacRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryRbacRepository {
    /// Creates a repository over a shared store.
    #[must_use]
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RbacRepository for InMemoryRbacRepository {
    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        let mut permissions = self.store.permissions.write().await;

        if permissions
            .values()
            .any(|existing| existing.key == permission.key)
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.key
            )));
        }

        permissions.insert(permission.id, permission);
        Ok(())
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self.store.permissions.read().await.get(&id).cloned())
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        Ok(self
            .store
            .permissions
            .read()
            .await
            .values()
            .find(|permission| &permission.key == key)
            .cloned())
    }

    async fn list_permissions(&self, service: Option<&str>) -> AppResult<Vec<Permission>> {
        let permissions = self.store.permissions.read().await;

        let mut listed: Vec<Permission> = permissions
            .values()
            .filter(|permission| {
                service.is_none_or(|service| permission.key.service() == service)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.key.cmp(&right.key));

        Ok(listed)
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let mut permissions = self.store.permissions.write().await;
        let policy_permissions = self.store.policy_permissions.read().await;

        if policy_permissions
            .iter()
            .any(|(_, permission_id)| *permission_id == id)
        {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete permission '{id}': still assigned to policies"
            )));
        }

        if permissions.remove(&id).is_none() {
            return Err(AppError::NotFound(format!(
                "permission '{id}' was not found"
            )));
        }

        Ok(())
    }

    async fn count_policies_with_permission(&self, id: PermissionId) -> AppResult<u64> {
        Ok(self
            .store
            .policy_permissions
            .read()
            .await
            .iter()
            .filter(|(_, permission_id)| *permission_id == id)
            .count() as u64)
    }

    async fn insert_policy(&self, policy: Policy) -> AppResult<()> {
        self.store.policies.write().await.insert(policy.id, policy);
        Ok(())
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        Ok(self.store.policies.read().await.get(&id).cloned())
    }

    async fn list_policies(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Policy>> {
        let policies = self.store.policies.read().await;

        let mut listed: Vec<Policy> = policies
            .values()
            .filter(|policy| match tenant_id {
                Some(tenant_id) => {
                    policy.tenant_id.is_none() || policy.tenant_id == Some(tenant_id)
                }
                None => policy.is_system,
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(listed)
    }

    async fn update_policy(&self, policy: Policy) -> AppResult<()> {
        self.store.policies.write().await.insert(policy.id, policy);
        Ok(())
    }

    async fn delete_policy(&self, id: PolicyId) -> AppResult<()> {
        let mut policies = self.store.policies.write().await;
        let mut policy_permissions = self.store.policy_permissions.write().await;
        let role_policies = self.store.role_policies.read().await;

        if role_policies.iter().any(|(_, policy_id)| *policy_id == id) {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete policy '{id}': still assigned to roles"
            )));
        }

        if policies.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("policy '{id}' was not found")));
        }

        policy_permissions.retain(|(policy_id, _)| *policy_id != id);
        Ok(())
    }

    async fn count_roles_with_policy(&self, id: PolicyId) -> AppResult<u64> {
        Ok(self
            .store
            .role_policies
            .read()
            .await
            .iter()
            .filter(|(_, policy_id)| *policy_id == id)
            .count() as u64)
    }

    async fn assign_permissions_to_policy(
        &self,
        policy_id: PolicyId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let permissions = self.store.permissions.read().await;
        let mut policy_permissions = self.store.policy_permissions.write().await;

        // Validate the whole batch before the first insert so a bad id can
        // never leave a partial assignment behind.
        for permission_id in permission_ids {
            if !permissions.contains_key(permission_id) {
                return Err(AppError::NotFound(format!(
                    "permission '{permission_id}' was not found"
                )));
            }
        }

        for permission_id in permission_ids {
            policy_permissions.insert((policy_id, *permission_id));
        }

        Ok(())
    }

    async fn revoke_permission_from_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.store
            .policy_permissions
            .write()
            .await
            .remove(&(policy_id, permission_id));
        Ok(())
    }

    async fn policy_permissions(&self, policy_id: PolicyId) -> AppResult<BTreeSet<PermissionKey>> {
        let permissions = self.store.permissions.read().await;
        let policy_permissions = self.store.policy_permissions.read().await;

        Ok(policy_permissions
            .iter()
            .filter(|(stored_policy_id, _)| *stored_policy_id == policy_id)
            .filter_map(|(_, permission_id)| {
                permissions
                    .get(permission_id)
                    .map(|permission| permission.key.clone())
            })
            .collect())
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        self.store.roles.write().await.insert(role.id, role);
        Ok(())
    }

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.store.roles.read().await.get(&id).cloned())
    }

    async fn list_roles(&self, tenant_id: Option<TenantId>) -> AppResult<Vec<Role>> {
        let roles = self.store.roles.read().await;

        let mut listed: Vec<Role> = roles
            .values()
            .filter(|role| match tenant_id {
                Some(tenant_id) => role.tenant_id.is_none() || role.tenant_id == Some(tenant_id),
                None => role.is_system,
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(listed)
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        self.store.roles.write().await.insert(role.id, role);
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        let mut roles = self.store.roles.write().await;
        let mut role_policies = self.store.role_policies.write().await;
        let memberships = self.store.memberships.read().await;

        if memberships
            .values()
            .any(|membership| membership.role_id == id)
        {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete role '{id}': still held by memberships"
            )));
        }

        if roles.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("role '{id}' was not found")));
        }

        role_policies.retain(|(role_id, _)| *role_id != id);
        Ok(())
    }

    async fn count_memberships_with_role(&self, id: RoleId) -> AppResult<u64> {
        Ok(self
            .store
            .memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.role_id == id)
            .count() as u64)
    }

    async fn assign_policies_to_role(
        &self,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()> {
        let policies = self.store.policies.read().await;
        let mut role_policies = self.store.role_policies.write().await;

        for policy_id in policy_ids {
            if !policies.contains_key(policy_id) {
                return Err(AppError::NotFound(format!(
                    "policy '{policy_id}' was not found"
                )));
            }
        }

        for policy_id in policy_ids {
            role_policies.insert((role_id, *policy_id));
        }

        Ok(())
    }

    async fn revoke_policy_from_role(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        self.store
            .role_policies
            .write()
            .await
            .remove(&(role_id, policy_id));
        Ok(())
    }

    async fn role_policies(&self, role_id: RoleId) -> AppResult<Vec<Policy>> {
        let policies = self.store.policies.read().await;
        let role_policies = self.store.role_policies.read().await;

        let mut listed: Vec<Policy> = role_policies
            .iter()
            .filter(|(stored_role_id, _)| *stored_role_id == role_id)
            .filter_map(|(_, policy_id)| policies.get(policy_id).cloned())
            .collect();
        listed.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(listed)
    }

    async fn role_effective_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        Ok(self.store.effective_permissions_for_role(role_id).await)
    }
}
