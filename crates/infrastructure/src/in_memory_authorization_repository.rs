use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use warden_application::AuthorizationRepository;
use warden_core::{AppResult, RoleId, TenantId};
use warden_domain::{PermissionKey, TenantMembership};

use crate::InMemoryStore;

/// In-memory read-side repository for the authorization resolver.
#[derive(Clone)]
pub struct InMemoryAuthorizationRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryAuthorizationRepository {
    /// Creates a repository over a shared store.
    #[must_use]
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn find_membership(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<Option<TenantMembership>> {
        Ok(self
            .store
            .memberships
            .read()
            .await
            .get(&(tenant_id, user_id.to_owned()))
            .cloned())
    }

    async fn role_effective_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        Ok(self.store.effective_permissions_for_role(role_id).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use warden_application::{
        AuthorizationService, MembershipRepository, PlatformAdminRepository, RbacRepository,
    };
    use warden_core::{PermissionId, PolicyId, RoleId, TenantId};
    use warden_domain::{
        MembershipStatus, Permission, PermissionKey, PlatformAdmin, Policy, Role, RoleKind,
        TenantMembership,
    };

    use crate::{
        InMemoryMembershipRepository, InMemoryPlatformAdminRepository, InMemoryRbacRepository,
        InMemoryStore,
    };

    use super::InMemoryAuthorizationRepository;

    fn key(service: &str, entity: &str, action: &str) -> PermissionKey {
        match PermissionKey::new(service, entity, action) {
            Ok(key) => key,
            Err(error) => panic!("test key must be valid: {error}"),
        }
    }

    fn permission(key: PermissionKey) -> Permission {
        Permission {
            id: PermissionId::new(),
            key,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn policy(name: &str) -> Policy {
        Policy {
            id: PolicyId::new(),
            name: name.to_owned(),
            description: None,
            tenant_id: None,
            is_system: true,
            created_at: Utc::now(),
        }
    }

    fn role(name: &str) -> Role {
        Role {
            id: RoleId::new(),
            name: name.to_owned(),
            kind: RoleKind::Tenant,
            description: None,
            tenant_id: None,
            is_system: true,
            created_at: Utc::now(),
        }
    }

    /// Builds the publish graph of the editorial scenario: permission
    /// `blog-api:post:publish` in policy "Publisher", policy "Publisher" in
    /// role "Editor", user `alice` active in the tenant with role "Editor".
    async fn editorial_graph() -> (AuthorizationService, TenantId) {
        let store = Arc::new(InMemoryStore::new());
        let rbac = InMemoryRbacRepository::new(store.clone());
        let memberships = InMemoryMembershipRepository::new(store.clone());

        let tenant_id = TenantId::new();

        let publish = permission(key("blog-api", "post", "publish"));
        let publisher = policy("Publisher");
        let editor = role("Editor");

        assert!(rbac.insert_permission(publish.clone()).await.is_ok());
        assert!(rbac.insert_policy(publisher.clone()).await.is_ok());
        assert!(rbac.insert_role(editor.clone()).await.is_ok());
        assert!(
            rbac.assign_permissions_to_policy(publisher.id, &[publish.id])
                .await
                .is_ok()
        );
        assert!(
            rbac.assign_policies_to_role(editor.id, &[publisher.id])
                .await
                .is_ok()
        );
        assert!(
            memberships
                .insert_membership(TenantMembership {
                    tenant_id,
                    user_id: "alice".to_owned(),
                    role_id: editor.id,
                    status: MembershipStatus::Active,
                    invited_by: None,
                    joined_at: Utc::now(),
                })
                .await
                .is_ok()
        );

        let service = AuthorizationService::new(
            Arc::new(InMemoryAuthorizationRepository::new(store.clone())),
            Arc::new(InMemoryPlatformAdminRepository::new(store)),
        );

        (service, tenant_id)
    }

    #[tokio::test]
    async fn editor_may_publish_but_not_delete() {
        let (service, tenant_id) = editorial_graph().await;

        assert!(
            service
                .authorize(tenant_id, "alice", &key("blog-api", "post", "publish"))
                .await
        );
        assert!(
            !service
                .authorize(tenant_id, "alice", &key("blog-api", "post", "delete"))
                .await
        );
    }

    #[tokio::test]
    async fn deactivating_the_membership_flips_the_decision() {
        let store = Arc::new(InMemoryStore::new());
        let rbac = InMemoryRbacRepository::new(store.clone());
        let memberships = InMemoryMembershipRepository::new(store.clone());

        let tenant_id = TenantId::new();
        let publish = permission(key("blog-api", "post", "publish"));
        let publisher = policy("Publisher");
        let editor = role("Editor");

        assert!(rbac.insert_permission(publish.clone()).await.is_ok());
        assert!(rbac.insert_policy(publisher.clone()).await.is_ok());
        assert!(rbac.insert_role(editor.clone()).await.is_ok());
        assert!(
            rbac.assign_permissions_to_policy(publisher.id, &[publish.id])
                .await
                .is_ok()
        );
        assert!(
            rbac.assign_policies_to_role(editor.id, &[publisher.id])
                .await
                .is_ok()
        );

        let mut membership = TenantMembership {
            tenant_id,
            user_id: "alice".to_owned(),
            role_id: editor.id,
            status: MembershipStatus::Active,
            invited_by: None,
            joined_at: Utc::now(),
        };
        assert!(memberships.insert_membership(membership.clone()).await.is_ok());

        let service = AuthorizationService::new(
            Arc::new(InMemoryAuthorizationRepository::new(store.clone())),
            Arc::new(InMemoryPlatformAdminRepository::new(store)),
        );

        let publish_key = key("blog-api", "post", "publish");
        assert!(service.authorize(tenant_id, "alice", &publish_key).await);

        membership.status = MembershipStatus::Inactive;
        assert!(memberships.update_membership(membership).await.is_ok());

        assert!(!service.authorize(tenant_id, "alice", &publish_key).await);
    }

    #[tokio::test]
    async fn platform_admin_needs_no_membership() {
        let (service, tenant_id) = editorial_graph().await;

        let store = Arc::new(InMemoryStore::new());
        let admins = InMemoryPlatformAdminRepository::new(store.clone());
        assert!(
            admins
                .insert_admin(PlatformAdmin {
                    user_id: "root".to_owned(),
                    created_by: None,
                    created_at: Utc::now(),
                })
                .await
                .is_ok()
        );

        // A dedicated service over a graph that has no membership for root.
        let admin_service = AuthorizationService::new(
            Arc::new(InMemoryAuthorizationRepository::new(store.clone())),
            Arc::new(admins),
        );

        assert!(
            admin_service
                .authorize(tenant_id, "root", &key("blog-api", "post", "publish"))
                .await
        );
        assert!(
            !service
                .authorize(tenant_id, "root", &key("blog-api", "post", "publish"))
                .await
        );
    }
}
