use std::sync::Arc;

use chrono::Utc;
use warden_core::{AppError, AppResult, UserIdentity};
use warden_domain::PlatformAdmin;

use crate::PlatformAdminRepository;

/// Application service for the platform administrator registry.
#[derive(Clone)]
pub struct PlatformAdminService {
    repository: Arc<dyn PlatformAdminRepository>,
}

impl PlatformAdminService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PlatformAdminRepository>) -> Self {
        Self { repository }
    }

    /// Returns whether the user holds a registry entry.
    pub async fn is_platform_admin(&self, user_id: &str) -> AppResult<bool> {
        self.repository.is_platform_admin(user_id).await
    }

    /// Ensures the caller holds a registry entry.
    pub async fn require_platform_admin(&self, actor: &UserIdentity) -> AppResult<()> {
        if self.repository.is_platform_admin(actor.user_id()).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is not a platform admin",
            actor.user_id()
        )))
    }

    /// Registers a new platform admin on behalf of an existing one.
    pub async fn create_admin(
        &self,
        actor: &UserIdentity,
        user_id: &str,
    ) -> AppResult<PlatformAdmin> {
        self.require_platform_admin(actor).await?;

        let user_id = validated_user_id(user_id)?;

        if self.repository.find_admin(user_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' is already a platform admin"
            )));
        }

        let admin = PlatformAdmin {
            user_id: user_id.to_owned(),
            created_by: Some(actor.user_id().to_owned()),
            created_at: Utc::now(),
        };

        self.repository.insert_admin(admin.clone()).await?;
        Ok(admin)
    }

    /// Returns one registry entry.
    pub async fn get_admin(&self, actor: &UserIdentity, user_id: &str) -> AppResult<PlatformAdmin> {
        self.require_platform_admin(actor).await?;

        self.repository.find_admin(user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("user '{user_id}' is not a platform admin"))
        })
    }

    /// Lists all registry entries.
    pub async fn list_admins(&self, actor: &UserIdentity) -> AppResult<Vec<PlatformAdmin>> {
        self.require_platform_admin(actor).await?;
        self.repository.list_admins().await
    }

    /// Removes a registry entry. The registry is never emptied: removing the
    /// final admin fails with `Conflict`.
    pub async fn delete_admin(&self, actor: &UserIdentity, user_id: &str) -> AppResult<()> {
        self.require_platform_admin(actor).await?;

        if self.repository.find_admin(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not a platform admin"
            )));
        }

        self.repository.delete_admin(user_id).await
    }

    /// Inserts the first registry entry out-of-band, bypassing the admin
    /// guard. Reserved for the CLI; idempotent so re-running a bootstrap is
    /// harmless.
    pub async fn bootstrap_admin(&self, user_id: &str) -> AppResult<PlatformAdmin> {
        let user_id = validated_user_id(user_id)?;

        if let Some(existing) = self.repository.find_admin(user_id).await? {
            return Ok(existing);
        }

        let admin = PlatformAdmin {
            user_id: user_id.to_owned(),
            created_by: None,
            created_at: Utc::now(),
        };

        self.repository.insert_admin(admin.clone()).await?;
        Ok(admin)
    }
}

fn validated_user_id(user_id: &str) -> AppResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id must not be empty".to_owned()));
    }

    Ok(user_id)
}
