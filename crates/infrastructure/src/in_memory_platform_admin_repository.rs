use std::sync::Arc;

use async_trait::async_trait;

use warden_application::PlatformAdminRepository;
use warden_core::{AppError, AppResult};
use warden_domain::PlatformAdmin;

use crate::InMemoryStore;

/// In-memory repository for the platform administrator registry.
#[derive(Clone)]
pub struct InMemoryPlatformAdminRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPlatformAdminRepository {
    /// Creates a repository over a shared store.
    #[must_use]
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PlatformAdminRepository for InMemoryPlatformAdminRepository {
    async fn insert_admin(&self, admin: PlatformAdmin) -> AppResult<()> {
        let mut admins = self.store.platform_admins.write().await;

        if admins
            .iter()
            .any(|existing| existing.user_id == admin.user_id)
        {
            return Err(AppError::Conflict(format!(
                "user '{}' is already a platform admin",
                admin.user_id
            )));
        }

        admins.push(admin);
        Ok(())
    }

    async fn find_admin(&self, user_id: &str) -> AppResult<Option<PlatformAdmin>> {
        Ok(self
            .store
            .platform_admins
            .read()
            .await
            .iter()
            .find(|admin| admin.user_id == user_id)
            .cloned())
    }

    async fn list_admins(&self) -> AppResult<Vec<PlatformAdmin>> {
        let mut listed = self.store.platform_admins.read().await.clone();
        listed.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(listed)
    }

    async fn delete_admin(&self, user_id: &str) -> AppResult<()> {
        let mut admins = self.store.platform_admins.write().await;

        if admins.len() <= 1 {
            return Err(AppError::Conflict(
                "cannot remove the last platform admin".to_owned(),
            ));
        }

        admins.retain(|admin| admin.user_id != user_id);
        Ok(())
    }

    async fn is_platform_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self
            .store
            .platform_admins
            .read()
            .await
            .iter()
            .any(|admin| admin.user_id == user_id))
    }
}
