use std::collections::BTreeSet;

use chrono::Utc;
use warden_core::{AppError, AppResult, PermissionId, PolicyId, TenantId, UserIdentity};
use warden_domain::{PermissionKey, Policy};

use crate::{CreatePolicyInput, UpdatePolicyInput};

use super::{RbacAdminService, validated_description, validated_name};

impl RbacAdminService {
    /// Creates a policy. A policy without a tenant is system-level and usable
    /// by any tenant's roles.
    pub async fn create_policy(
        &self,
        actor: &UserIdentity,
        input: CreatePolicyInput,
    ) -> AppResult<Policy> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let policy = Policy {
            id: PolicyId::new(),
            name: validated_name(input.name)?,
            description: validated_description(input.description)?,
            tenant_id: input.tenant_id,
            is_system: input.tenant_id.is_none(),
            created_at: Utc::now(),
        };

        self.repository.insert_policy(policy.clone()).await?;
        Ok(policy)
    }

    /// Returns one policy.
    pub async fn get_policy(&self, actor: &UserIdentity, id: PolicyId) -> AppResult<Policy> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_policy_or_not_found(id).await
    }

    /// Lists policies visible in the given tenant scope.
    pub async fn list_policies(
        &self,
        actor: &UserIdentity,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<Policy>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.repository.list_policies(tenant_id).await
    }

    /// Updates a policy's name or description.
    pub async fn update_policy(
        &self,
        actor: &UserIdentity,
        id: PolicyId,
        input: UpdatePolicyInput,
    ) -> AppResult<Policy> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let mut policy = self.find_policy_or_not_found(id).await?;

        if let Some(name) = input.name {
            policy.name = validated_name(name)?;
        }
        if let Some(description) = input.description {
            policy.description = validated_description(Some(description))?;
        }

        self.repository.update_policy(policy.clone()).await?;
        Ok(policy)
    }

    /// Deletes a policy. Deletion is restricted while any role still
    /// references the policy.
    pub async fn delete_policy(&self, actor: &UserIdentity, id: PolicyId) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let policy = self.find_policy_or_not_found(id).await?;

        let references = self.repository.count_roles_with_policy(id).await?;
        if references > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete policy '{}': referenced by {references} roles",
                policy.name
            )));
        }

        self.repository.delete_policy(id).await
    }

    /// Assigns permissions to a policy as one atomic batch. Already-assigned
    /// pairs are ignored; an unknown permission id aborts the whole batch.
    pub async fn assign_permissions(
        &self,
        actor: &UserIdentity,
        policy_id: PolicyId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        if permission_ids.is_empty() {
            return Err(AppError::Validation(
                "permission_ids must not be empty".to_owned(),
            ));
        }

        self.find_policy_or_not_found(policy_id).await?;

        self.repository
            .assign_permissions_to_policy(policy_id, permission_ids)
            .await
    }

    /// Removes one permission from a policy. Revoking an unassigned
    /// permission is a no-op, not an error.
    pub async fn revoke_permission(
        &self,
        actor: &UserIdentity,
        policy_id: PolicyId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_policy_or_not_found(policy_id).await?;

        self.repository
            .revoke_permission_from_policy(policy_id, permission_id)
            .await
    }

    /// Returns the de-duplicated permission keys directly assigned to a
    /// policy.
    pub async fn policy_permissions(
        &self,
        actor: &UserIdentity,
        policy_id: PolicyId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_policy_or_not_found(policy_id).await?;

        self.repository.policy_permissions(policy_id).await
    }

    async fn find_policy_or_not_found(&self, id: PolicyId) -> AppResult<Policy> {
        self.repository
            .find_policy(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{id}' was not found")))
    }
}
