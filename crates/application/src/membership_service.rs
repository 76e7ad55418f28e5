use std::sync::Arc;

use chrono::Utc;
use warden_core::{AppError, AppResult, TenantId, UserIdentity};
use warden_domain::{MembershipStatus, Role, RoleKind, TenantMembership};

use crate::{
    AddMemberInput, MembershipRepository, PlatformAdminService, RbacRepository, UpdateMemberInput,
};

/// Application service for tenant membership administration.
///
/// Mutations follow the platform-admin rule of the mutation API; reads are
/// open to active members of the tenant in question.
#[derive(Clone)]
pub struct MembershipService {
    repository: Arc<dyn MembershipRepository>,
    rbac_repository: Arc<dyn RbacRepository>,
    platform_admin_service: PlatformAdminService,
}

impl MembershipService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MembershipRepository>,
        rbac_repository: Arc<dyn RbacRepository>,
        platform_admin_service: PlatformAdminService,
    ) -> Self {
        Self {
            repository,
            rbac_repository,
            platform_admin_service,
        }
    }

    /// Adds a member to a tenant with a single role. New members start
    /// active.
    pub async fn add_member(
        &self,
        actor: &UserIdentity,
        tenant_id: TenantId,
        input: AddMemberInput,
    ) -> AppResult<TenantMembership> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let user_id = input.user_id.trim().to_owned();
        if user_id.is_empty() {
            return Err(AppError::Validation("user_id must not be empty".to_owned()));
        }

        if self
            .repository
            .find_membership(tenant_id, user_id.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' is already a member of tenant '{tenant_id}'"
            )));
        }

        let role = self
            .rbac_repository
            .find_role(input.role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{}' was not found", input.role_id)))?;
        validate_member_role(&role, tenant_id)?;

        let membership = TenantMembership {
            tenant_id,
            user_id,
            role_id: role.id,
            status: MembershipStatus::Active,
            invited_by: Some(actor.user_id().to_owned()),
            joined_at: Utc::now(),
        };

        self.repository.insert_membership(membership.clone()).await?;
        Ok(membership)
    }

    /// Returns one membership.
    pub async fn get_member(
        &self,
        actor: &UserIdentity,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<TenantMembership> {
        self.require_member_read(actor, tenant_id).await?;

        self.repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| member_not_found(tenant_id, user_id))
    }

    /// Lists tenant members.
    pub async fn list_members(
        &self,
        actor: &UserIdentity,
        tenant_id: TenantId,
    ) -> AppResult<Vec<TenantMembership>> {
        self.require_member_read(actor, tenant_id).await?;
        self.repository.list_memberships(tenant_id).await
    }

    /// Updates a member's role or lifecycle status.
    pub async fn update_member(
        &self,
        actor: &UserIdentity,
        tenant_id: TenantId,
        user_id: &str,
        input: UpdateMemberInput,
    ) -> AppResult<TenantMembership> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let mut membership = self
            .repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| member_not_found(tenant_id, user_id))?;

        if let Some(role_id) = input.role_id {
            let role = self
                .rbac_repository
                .find_role(role_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;
            validate_member_role(&role, tenant_id)?;
            membership.role_id = role.id;
        }

        if let Some(status) = input.status {
            membership.status = status;
        }

        self.repository.update_membership(membership.clone()).await?;
        Ok(membership)
    }

    /// Removes a member from a tenant.
    pub async fn remove_member(
        &self,
        actor: &UserIdentity,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.repository
            .find_membership(tenant_id, user_id)
            .await?
            .ok_or_else(|| member_not_found(tenant_id, user_id))?;

        self.repository.delete_membership(tenant_id, user_id).await
    }

    async fn require_member_read(&self, actor: &UserIdentity, tenant_id: TenantId) -> AppResult<()> {
        if self
            .platform_admin_service
            .is_platform_admin(actor.user_id())
            .await?
        {
            return Ok(());
        }

        match self
            .repository
            .find_membership(tenant_id, actor.user_id())
            .await?
        {
            Some(membership) if membership.status == MembershipStatus::Active => Ok(()),
            _ => Err(AppError::Forbidden(format!(
                "user '{}' is not an active member of tenant '{tenant_id}'",
                actor.user_id()
            ))),
        }
    }
}

fn validate_member_role(role: &Role, tenant_id: TenantId) -> AppResult<()> {
    if role.kind != RoleKind::Tenant {
        return Err(AppError::Validation(format!(
            "role '{}' is a {} role and cannot be held by a membership",
            role.name,
            role.kind.as_str()
        )));
    }

    if let Some(role_tenant_id) = role.tenant_id
        && role_tenant_id != tenant_id
    {
        return Err(AppError::Validation(format!(
            "role '{}' does not belong to tenant '{tenant_id}'",
            role.name
        )));
    }

    Ok(())
}

fn member_not_found(tenant_id: TenantId, user_id: &str) -> AppError {
    AppError::NotFound(format!(
        "user '{user_id}' is not a member of tenant '{tenant_id}'"
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use warden_core::{
        AppError, AppResult, PermissionId, PolicyId, RoleId, TenantId, UserIdentity,
    };
    use warden_domain::{
        MembershipStatus, Permission, PermissionKey, PlatformAdmin, Policy, Role, RoleKind,
        TenantMembership,
    };

    use crate::{
        AddMemberInput, MembershipRepository, PlatformAdminRepository, PlatformAdminService,
        RbacRepository, UpdateMemberInput,
    };

    use super::MembershipService;

    #[derive(Default)]
    struct FakeMembershipRepository {
        memberships: Mutex<HashMap<(TenantId, String), TenantMembership>>,
    }

    #[async_trait]
    impl MembershipRepository for FakeMembershipRepository {
        async fn insert_membership(&self, membership: TenantMembership) -> AppResult<()> {
            self.memberships.lock().await.insert(
                (membership.tenant_id, membership.user_id.clone()),
                membership,
            );
            Ok(())
        }

        async fn find_membership(
            &self,
            tenant_id: TenantId,
            user_id: &str,
        ) -> AppResult<Option<TenantMembership>> {
            Ok(self
                .memberships
                .lock()
                .await
                .get(&(tenant_id, user_id.to_owned()))
                .cloned())
        }

        async fn list_memberships(
            &self,
            tenant_id: TenantId,
        ) -> AppResult<Vec<TenantMembership>> {
            let mut listed: Vec<TenantMembership> = self
                .memberships
                .lock()
                .await
                .values()
                .filter(|membership| membership.tenant_id == tenant_id)
                .cloned()
                .collect();
            listed.sort_by(|left, right| left.user_id.cmp(&right.user_id));
            Ok(listed)
        }

        async fn update_membership(&self, membership: TenantMembership) -> AppResult<()> {
            self.memberships.lock().await.insert(
                (membership.tenant_id, membership.user_id.clone()),
                membership,
            );
            Ok(())
        }

        async fn delete_membership(&self, tenant_id: TenantId, user_id: &str) -> AppResult<()> {
            self.memberships
                .lock()
                .await
                .remove(&(tenant_id, user_id.to_owned()));
            Ok(())
        }
    }

    struct FakeRoleStore {
        roles: HashMap<RoleId, Role>,
    }

    #[async_trait]
    impl RbacRepository for FakeRoleStore {
        async fn insert_permission(&self, _permission: Permission) -> AppResult<()> {
            Ok(())
        }

        async fn find_permission(&self, _id: PermissionId) -> AppResult<Option<Permission>> {
            Ok(None)
        }

        async fn find_permission_by_key(
            &self,
            _key: &PermissionKey,
        ) -> AppResult<Option<Permission>> {
            Ok(None)
        }

        async fn list_permissions(&self, _service: Option<&str>) -> AppResult<Vec<Permission>> {
            Ok(Vec::new())
        }

        async fn delete_permission(&self, _id: PermissionId) -> AppResult<()> {
            Ok(())
        }

        async fn count_policies_with_permission(&self, _id: PermissionId) -> AppResult<u64> {
            Ok(0)
        }

        async fn insert_policy(&self, _policy: Policy) -> AppResult<()> {
            Ok(())
        }

        async fn find_policy(&self, _id: PolicyId) -> AppResult<Option<Policy>> {
            Ok(None)
        }

        async fn list_policies(&self, _tenant_id: Option<TenantId>) -> AppResult<Vec<Policy>> {
            Ok(Vec::new())
        }

        async fn update_policy(&self, _policy: Policy) -> AppResult<()> {
            Ok(())
        }

        async fn delete_policy(&self, _id: PolicyId) -> AppResult<()> {
            Ok(())
        }

        async fn count_roles_with_policy(&self, _id: PolicyId) -> AppResult<u64> {
            Ok(0)
        }

        async fn assign_permissions_to_policy(
            &self,
            _policy_id: PolicyId,
            _permission_ids: &[PermissionId],
        ) -> AppResult<()> {
            Ok(())
        }

        async fn revoke_permission_from_policy(
            &self,
            _policy_id: PolicyId,
            _permission_id: PermissionId,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn policy_permissions(
            &self,
            _policy_id: PolicyId,
        ) -> AppResult<std::collections::BTreeSet<PermissionKey>> {
            Ok(std::collections::BTreeSet::new())
        }

        async fn insert_role(&self, _role: Role) -> AppResult<()> {
            Ok(())
        }

        async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
            Ok(self.roles.get(&id).cloned())
        }

        async fn list_roles(&self, _tenant_id: Option<TenantId>) -> AppResult<Vec<Role>> {
            Ok(Vec::new())
        }

        async fn update_role(&self, _role: Role) -> AppResult<()> {
            Ok(())
        }

        async fn delete_role(&self, _id: RoleId) -> AppResult<()> {
            Ok(())
        }

        async fn count_memberships_with_role(&self, _id: RoleId) -> AppResult<u64> {
            Ok(0)
        }

        async fn assign_policies_to_role(
            &self,
            _role_id: RoleId,
            _policy_ids: &[PolicyId],
        ) -> AppResult<()> {
            Ok(())
        }

        async fn revoke_policy_from_role(
            &self,
            _role_id: RoleId,
            _policy_id: PolicyId,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn role_policies(&self, _role_id: RoleId) -> AppResult<Vec<Policy>> {
            Ok(Vec::new())
        }

        async fn role_effective_permissions(
            &self,
            _role_id: RoleId,
        ) -> AppResult<std::collections::BTreeSet<PermissionKey>> {
            Ok(std::collections::BTreeSet::new())
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

    fn role(id: RoleId, kind: RoleKind, tenant_id: Option<TenantId>) -> Role {
        Role {
            id,
            name: "Editor".to_owned(),
            kind,
            description: None,
            tenant_id,
            is_system: tenant_id.is_none(),
            created_at: Utc::now(),
        }
    }

    fn service_with_roles(roles: Vec<Role>) -> (MembershipService, Arc<FakeMembershipRepository>) {
        let repository = Arc::new(FakeMembershipRepository::default());
        let role_store = FakeRoleStore {
            roles: roles.into_iter().map(|role| (role.id, role)).collect(),
        };
        let platform_admin_service =
            PlatformAdminService::new(Arc::new(FakePlatformAdminRepository {
                admins: HashSet::from(["root".to_owned()]),
            }));
        let service = MembershipService::new(
            repository.clone(),
            Arc::new(role_store),
            platform_admin_service,
        );
        (service, repository)
    }

    #[tokio::test]
    async fn add_member_requires_platform_admin() {
        let role_id = RoleId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);

        let result = service
            .add_member(
                &UserIdentity::new("mallory"),
                TenantId::new(),
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn add_member_rejects_platform_role() {
        let role_id = RoleId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Platform, None)]);

        let result = service
            .add_member(
                &UserIdentity::new("root"),
                TenantId::new(),
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn add_member_rejects_foreign_tenant_role() {
        let role_id = RoleId::new();
        let other_tenant = TenantId::new();
        let (service, _) =
            service_with_roles(vec![role(role_id, RoleKind::Tenant, Some(other_tenant))]);

        let result = service
            .add_member(
                &UserIdentity::new("root"),
                TenantId::new(),
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn add_member_rejects_duplicate() {
        let role_id = RoleId::new();
        let tenant_id = TenantId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);
        let actor = UserIdentity::new("root");

        let first = service
            .add_member(
                &actor,
                tenant_id,
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;
        assert!(first.is_ok());

        let second = service
            .add_member(
                &actor,
                tenant_id,
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_member_changes_status() {
        let role_id = RoleId::new();
        let tenant_id = TenantId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);
        let actor = UserIdentity::new("root");

        let added = service
            .add_member(
                &actor,
                tenant_id,
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;
        assert!(added.is_ok());

        let updated = service
            .update_member(
                &actor,
                tenant_id,
                "alice",
                UpdateMemberInput {
                    role_id: None,
                    status: Some(MembershipStatus::Inactive),
                },
            )
            .await;

        assert_eq!(
            updated.ok().map(|membership| membership.status),
            Some(MembershipStatus::Inactive)
        );
    }

    #[tokio::test]
    async fn member_reads_denied_to_outsiders() {
        let role_id = RoleId::new();
        let tenant_id = TenantId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);

        let result = service
            .list_members(&UserIdentity::new("outsider"), tenant_id)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn member_reads_allowed_to_active_members() {
        let role_id = RoleId::new();
        let tenant_id = TenantId::new();
        let (service, _) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);
        let actor = UserIdentity::new("root");

        let added = service
            .add_member(
                &actor,
                tenant_id,
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;
        assert!(added.is_ok());

        let listed = service
            .list_members(&UserIdentity::new("alice"), tenant_id)
            .await;

        assert_eq!(listed.ok().map(|members| members.len()), Some(1));
    }

    #[tokio::test]
    async fn remove_member_deletes_the_binding() {
        let role_id = RoleId::new();
        let tenant_id = TenantId::new();
        let (service, repository) = service_with_roles(vec![role(role_id, RoleKind::Tenant, None)]);
        let actor = UserIdentity::new("root");

        let added = service
            .add_member(
                &actor,
                tenant_id,
                AddMemberInput {
                    user_id: "alice".to_owned(),
                    role_id,
                },
            )
            .await;
        assert!(added.is_ok());

        let removed = service.remove_member(&actor, tenant_id, "alice").await;
        assert!(removed.is_ok());
        assert!(repository.memberships.lock().await.is_empty());
    }
}
