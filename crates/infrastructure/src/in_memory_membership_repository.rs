use std::sync::Arc;

use async_trait::async_trait;

use warden_application::MembershipRepository;
use warden_core::{AppError, AppResult, TenantId};
use warden_domain::TenantMembership;

use crate::InMemoryStore;

/// In-memory repository for tenant membership rows.
#[derive(Clone)]
pub struct InMemoryMembershipRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryMembershipRepository {
    /// Creates a repository over a shared store.
    #[must_use]
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn insert_membership(&self, membership: TenantMembership) -> AppResult<()> {
        let key = (membership.tenant_id, membership.user_id.clone());
        let mut memberships = self.store.memberships.write().await;

        if memberships.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' is already a member of tenant '{}'",
                key.1, key.0
            )));
        }

        memberships.insert(key, membership);
        Ok(())
    }

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

    async fn list_memberships(&self, tenant_id: TenantId) -> AppResult<Vec<TenantMembership>> {
        let memberships = self.store.memberships.read().await;

        let mut listed: Vec<TenantMembership> = memberships
            .values()
            .filter(|membership| membership.tenant_id == tenant_id)
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.user_id.cmp(&right.user_id));

        Ok(listed)
    }

    async fn update_membership(&self, membership: TenantMembership) -> AppResult<()> {
        self.store.memberships.write().await.insert(
            (membership.tenant_id, membership.user_id.clone()),
            membership,
        );
        Ok(())
    }

    async fn delete_membership(&self, tenant_id: TenantId, user_id: &str) -> AppResult<()> {
        if self
            .store
            .memberships
            .write()
            .await
            .remove(&(tenant_id, user_id.to_owned()))
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a member of tenant '{tenant_id}'"
            )));
        }

        Ok(())
    }
}
