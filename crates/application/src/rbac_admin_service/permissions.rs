use chrono::Utc;
use warden_core::{AppError, AppResult, PermissionId, UserIdentity};
use warden_domain::{Permission, PermissionKey};

use crate::CreatePermissionInput;

use super::{RbacAdminService, validated_description};

impl RbacAdminService {
    /// Adds a permission to the catalog.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let key = PermissionKey::new(input.service, input.entity, input.action)?;
        let description = validated_description(input.description)?;

        if self.repository.find_permission_by_key(&key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "permission '{key}' already exists"
            )));
        }

        let permission = Permission {
            id: PermissionId::new(),
            key,
            description,
            created_at: Utc::now(),
        };

        self.repository.insert_permission(permission.clone()).await?;
        Ok(permission)
    }

    /// Returns one catalog permission.
    pub async fn get_permission(
        &self,
        actor: &UserIdentity,
        id: PermissionId,
    ) -> AppResult<Permission> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.repository
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))
    }

    /// Lists catalog permissions, optionally filtered by service.
    pub async fn list_permissions(
        &self,
        actor: &UserIdentity,
        service: Option<&str>,
    ) -> AppResult<Vec<Permission>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.repository.list_permissions(service).await
    }

    /// Removes a permission from the catalog. Deletion is restricted while
    /// any policy still references the permission.
    pub async fn delete_permission(&self, actor: &UserIdentity, id: PermissionId) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let permission = self
            .repository
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))?;

        let references = self.repository.count_policies_with_permission(id).await?;
        if references > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete permission '{}': referenced by {references} policies",
                permission.key
            )));
        }

        self.repository.delete_permission(id).await
    }
}
