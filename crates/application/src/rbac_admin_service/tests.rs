use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{
    AppError, AppResult, PermissionId, PolicyId, RoleId, TenantId, UserIdentity,
};
use warden_domain::{Permission, PermissionKey, PlatformAdmin, Policy, Role, RoleKind};

use crate::{
    CreatePermissionInput, CreatePolicyInput, CreateRoleInput, PlatformAdminRepository,
    PlatformAdminService, RbacRepository, UpdatePolicyInput,
};

use super::RbacAdminService;

#[derive(Default)]
struct FakeRbacRepository {
    permissions: Mutex<HashMap<PermissionId, Permission>>,
    policies: Mutex<HashMap<PolicyId, Policy>>,
    roles: Mutex<HashMap<RoleId, Role>>,
    policy_permissions: Mutex<HashSet<(PolicyId, PermissionId)>>,
    role_policies: Mutex<HashSet<(RoleId, PolicyId)>>,
    role_membership_counts: Mutex<HashMap<RoleId, u64>>,
}

#[async_trait]
impl RbacRepository for FakeRbacRepository {
    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        self.permissions
            .lock()
            .await
            .insert(permission.id, permission);
        Ok(())
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self.permissions.lock().await.get(&id).cloned())
    }

    async fn find_permission_by_key(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        Ok(self
            .permissions
            .lock()
            .await
            .values()
            .find(|permission| &permission.key == key)
            .cloned())
    }

    async fn list_permissions(&self, service: Option<&str>) -> AppResult<Vec<Permission>> {
        let mut listed: Vec<Permission> = self
            .permissions
            .lock()
            .await
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
        self.permissions.lock().await.remove(&id);
        Ok(())
    }

    async fn count_policies_with_permission(&self, id: PermissionId) -> AppResult<u64> {
        Ok(self
            .policy_permissions
            .lock()
            .await
            .iter()
            .filter(|(_, permission_id)| *permission_id == id)
            .count() as u64)
    }

    async fn insert_policy(&self, policy: Policy) -> AppResult<()> {
        self.policies.lock().await.insert(policy.id, policy);
        Ok(())
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        Ok(self.policies.lock().await.get(&id).cloned())
    }

    async fn list_policies(&self, _tenant_id: Option<TenantId>) -> AppResult<Vec<Policy>> {
        Ok(self.policies.lock().await.values().cloned().collect())
    }

    async fn update_policy(&self, policy: Policy) -> AppResult<()> {
        self.policies.lock().await.insert(policy.id, policy);
        Ok(())
    }

    async fn delete_policy(&self, id: PolicyId) -> AppResult<()> {
        self.policies.lock().await.remove(&id);
        Ok(())
    }

    async fn count_roles_with_policy(&self, id: PolicyId) -> AppResult<u64> {
        Ok(self
            .role_policies
            .lock()
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
        let permissions = self.permissions.lock().await;
        for permission_id in permission_ids {
            if !permissions.contains_key(permission_id) {
                return Err(AppError::NotFound(format!(
                    "permission '{permission_id}' was not found"
                )));
            }
        }

        let mut assignments = self.policy_permissions.lock().await;
        for permission_id in permission_ids {
            assignments.insert((policy_id, *permission_id));
        }
        Ok(())
    }

    async fn revoke_permission_from_policy(
        &self,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.policy_permissions
            .lock()
            .await
            .remove(&(policy_id, permission_id));
        Ok(())
    }

    async fn policy_permissions(&self, policy_id: PolicyId) -> AppResult<BTreeSet<PermissionKey>> {
        let permissions = self.permissions.lock().await;
        Ok(self
            .policy_permissions
            .lock()
            .await
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
        self.roles.lock().await.insert(role.id, role);
        Ok(())
    }

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.lock().await.get(&id).cloned())
    }

    async fn list_roles(&self, _tenant_id: Option<TenantId>) -> AppResult<Vec<Role>> {
        Ok(self.roles.lock().await.values().cloned().collect())
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        self.roles.lock().await.insert(role.id, role);
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        self.roles.lock().await.remove(&id);
        Ok(())
    }

    async fn count_memberships_with_role(&self, id: RoleId) -> AppResult<u64> {
        Ok(self
            .role_membership_counts
            .lock()
            .await
            .get(&id)
            .copied()
            .unwrap_or_default())
    }

    async fn assign_policies_to_role(
        &self,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()> {
        let policies = self.policies.lock().await;
        for policy_id in policy_ids {
            if !policies.contains_key(policy_id) {
                return Err(AppError::NotFound(format!(
                    "policy '{policy_id}' was not found"
                )));
            }
        }

        let mut assignments = self.role_policies.lock().await;
        for policy_id in policy_ids {
            assignments.insert((role_id, *policy_id));
        }
        Ok(())
    }

    async fn revoke_policy_from_role(
        &self,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        self.role_policies.lock().await.remove(&(role_id, policy_id));
        Ok(())
    }

    async fn role_policies(&self, role_id: RoleId) -> AppResult<Vec<Policy>> {
        let policies = self.policies.lock().await;
        Ok(self
            .role_policies
            .lock()
            .await
            .iter()
            .filter(|(stored_role_id, _)| *stored_role_id == role_id)
            .filter_map(|(_, policy_id)| policies.get(policy_id).cloned())
            .collect())
    }

    async fn role_effective_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        let permissions = self.permissions.lock().await;
        let policy_permissions = self.policy_permissions.lock().await;

        Ok(self
            .role_policies
            .lock()
            .await
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
            .collect())
    }
}

struct FakePlatformAdminRepository {
    admins: HashSet<String>,
}

#[async_trait]
impl PlatformAdminRepository for FakePlatformAdminRepository {
    async fn insert_admin(&self, _admin: PlatformAdmin) -> AppResult<()> {
        Ok(())
    }

    async fn find_admin(&self, _user_id: &str) -> AppResult<Option<PlatformAdmin>> {
        Ok(None)
    }

    async fn list_admins(&self) -> AppResult<Vec<PlatformAdmin>> {
        Ok(Vec::new())
    }

    async fn delete_admin(&self, _user_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn is_platform_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.admins.contains(user_id))
    }
}

fn admin_actor() -> UserIdentity {
    UserIdentity::new("root")
}

fn service_with_repository() -> (RbacAdminService, Arc<FakeRbacRepository>) {
    let repository = Arc::new(FakeRbacRepository::default());
    let platform_admin_service = PlatformAdminService::new(Arc::new(FakePlatformAdminRepository {
        admins: HashSet::from(["root".to_owned()]),
    }));
    let service = RbacAdminService::new(repository.clone(), platform_admin_service);
    (service, repository)
}

fn permission_input(service: &str, entity: &str, action: &str) -> CreatePermissionInput {
    CreatePermissionInput {
        service: service.to_owned(),
        entity: entity.to_owned(),
        action: action.to_owned(),
        description: None,
    }
}

fn policy_input(name: &str) -> CreatePolicyInput {
    CreatePolicyInput {
        name: name.to_owned(),
        description: None,
        tenant_id: None,
    }
}

fn role_input(name: &str) -> CreateRoleInput {
    CreateRoleInput {
        name: name.to_owned(),
        kind: RoleKind::Tenant,
        description: None,
        tenant_id: None,
    }
}

#[tokio::test]
async fn create_permission_requires_platform_admin() {
    let (service, _) = service_with_repository();

    let result = service
        .create_permission(
            &UserIdentity::new("mallory"),
            permission_input("blog-api", "post", "publish"),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn create_permission_rejects_duplicate_key() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let first = service
        .create_permission(&actor, permission_input("blog-api", "post", "publish"))
        .await;
    assert!(first.is_ok());

    let second = service
        .create_permission(&actor, permission_input("blog-api", "post", "publish"))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn create_permission_rejects_separator_in_parts() {
    let (service, _) = service_with_repository();

    let result = service
        .create_permission(&admin_actor(), permission_input("blog:api", "post", "publish"))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn delete_permission_blocked_while_referenced() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let Ok(permission) = service
        .create_permission(&actor, permission_input("blog-api", "post", "publish"))
        .await
    else {
        panic!("permission creation must succeed");
    };
    let Ok(policy) = service.create_policy(&actor, policy_input("Publisher")).await else {
        panic!("policy creation must succeed");
    };

    let assigned = service
        .assign_permissions(&actor, policy.id, &[permission.id])
        .await;
    assert!(assigned.is_ok());

    let blocked = service.delete_permission(&actor, permission.id).await;
    assert!(matches!(blocked, Err(AppError::ReferentialIntegrity(_))));

    let revoked = service
        .revoke_permission(&actor, policy.id, permission.id)
        .await;
    assert!(revoked.is_ok());

    let deleted = service.delete_permission(&actor, permission.id).await;
    assert!(deleted.is_ok());
}

#[tokio::test]
async fn assign_permissions_with_unknown_id_aborts_batch() {
    let (service, repository) = service_with_repository();
    let actor = admin_actor();

    let Ok(permission) = service
        .create_permission(&actor, permission_input("blog-api", "post", "publish"))
        .await
    else {
        panic!("permission creation must succeed");
    };
    let Ok(policy) = service.create_policy(&actor, policy_input("Publisher")).await else {
        panic!("policy creation must succeed");
    };

    let result = service
        .assign_permissions(&actor, policy.id, &[permission.id, PermissionId::new()])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repository.policy_permissions.lock().await.is_empty());
}

#[tokio::test]
async fn revoke_permission_is_idempotent() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let Ok(policy) = service.create_policy(&actor, policy_input("Publisher")).await else {
        panic!("policy creation must succeed");
    };
    let unassigned = PermissionId::new();

    let first = service.revoke_permission(&actor, policy.id, unassigned).await;
    let second = service.revoke_permission(&actor, policy.id, unassigned).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn assign_policies_rejects_empty_batch() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let Ok(role) = service.create_role(&actor, role_input("Editor")).await else {
        panic!("role creation must succeed");
    };

    let result = service.assign_policies(&actor, role.id, &[]).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn role_effective_permissions_unions_across_policies() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let Ok(publish) = service
        .create_permission(&actor, permission_input("blog-api", "post", "publish"))
        .await
    else {
        panic!("permission creation must succeed");
    };
    let Ok(review) = service
        .create_permission(&actor, permission_input("blog-api", "post", "review"))
        .await
    else {
        panic!("permission creation must succeed");
    };

    let Ok(publisher) = service.create_policy(&actor, policy_input("Publisher")).await else {
        panic!("policy creation must succeed");
    };
    let Ok(reviewer) = service.create_policy(&actor, policy_input("Reviewer")).await else {
        panic!("policy creation must succeed");
    };

    // `publish` is reachable through both policies; the union must still
    // contain it once.
    assert!(
        service
            .assign_permissions(&actor, publisher.id, &[publish.id])
            .await
            .is_ok()
    );
    assert!(
        service
            .assign_permissions(&actor, reviewer.id, &[publish.id, review.id])
            .await
            .is_ok()
    );

    let Ok(role) = service.create_role(&actor, role_input("Editor")).await else {
        panic!("role creation must succeed");
    };
    assert!(
        service
            .assign_policies(&actor, role.id, &[publisher.id, reviewer.id])
            .await
            .is_ok()
    );

    let effective = service.role_effective_permissions(&actor, role.id).await;
    assert_eq!(
        effective.ok(),
        Some(BTreeSet::from([publish.key, review.key]))
    );
}

#[tokio::test]
async fn delete_role_blocked_while_held_by_membership() {
    let (service, repository) = service_with_repository();
    let actor = admin_actor();

    let Ok(role) = service.create_role(&actor, role_input("Editor")).await else {
        panic!("role creation must succeed");
    };
    repository
        .role_membership_counts
        .lock()
        .await
        .insert(role.id, 2);

    let result = service.delete_role(&actor, role.id).await;
    assert!(matches!(result, Err(AppError::ReferentialIntegrity(_))));
}

#[tokio::test]
async fn update_policy_validates_name() {
    let (service, _) = service_with_repository();
    let actor = admin_actor();

    let Ok(policy) = service.create_policy(&actor, policy_input("Publisher")).await else {
        panic!("policy creation must succeed");
    };

    let result = service
        .update_policy(
            &actor,
            policy.id,
            UpdatePolicyInput {
                name: Some("x".to_owned()),
                description: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn system_policy_is_flagged_from_missing_tenant() {
    let (service, _) = service_with_repository();

    let result = service
        .create_policy(&admin_actor(), policy_input("Baseline"))
        .await;

    assert_eq!(result.ok().map(|policy| policy.is_system), Some(true));
}
