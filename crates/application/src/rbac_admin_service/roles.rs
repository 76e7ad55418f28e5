use std::collections::BTreeSet;

use chrono::Utc;
use warden_core::{AppError, AppResult, PolicyId, RoleId, TenantId, UserIdentity};
use warden_domain::{PermissionKey, Policy, Role};

use crate::{CreateRoleInput, UpdateRoleInput};

use super::{RbacAdminService, validated_description, validated_name};

impl RbacAdminService {
    /// Creates a role. A role without a tenant is system-level and
    /// assignable in any tenant.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let role = Role {
            id: RoleId::new(),
            name: validated_name(input.name)?,
            kind: input.kind,
            description: validated_description(input.description)?,
            tenant_id: input.tenant_id,
            is_system: input.tenant_id.is_none(),
            created_at: Utc::now(),
        };

        self.repository.insert_role(role.clone()).await?;
        Ok(role)
    }

    /// Returns one role.
    pub async fn get_role(&self, actor: &UserIdentity, id: RoleId) -> AppResult<Role> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_role_or_not_found(id).await
    }

    /// Lists roles visible in the given tenant scope.
    pub async fn list_roles(
        &self,
        actor: &UserIdentity,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<Role>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.repository.list_roles(tenant_id).await
    }

    /// Updates a role's name or description.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let mut role = self.find_role_or_not_found(id).await?;

        if let Some(name) = input.name {
            role.name = validated_name(name)?;
        }
        if let Some(description) = input.description {
            role.description = validated_description(Some(description))?;
        }

        self.repository.update_role(role.clone()).await?;
        Ok(role)
    }

    /// Deletes a role. Deletion is restricted while any membership still
    /// holds the role.
    pub async fn delete_role(&self, actor: &UserIdentity, id: RoleId) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        let role = self.find_role_or_not_found(id).await?;

        let references = self.repository.count_memberships_with_role(id).await?;
        if references > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "cannot delete role '{}': held by {references} memberships",
                role.name
            )));
        }

        self.repository.delete_role(id).await
    }

    /// Assigns policies to a role as one atomic batch with the same contract
    /// as policy permission assignment.
    pub async fn assign_policies(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        policy_ids: &[PolicyId],
    ) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        if policy_ids.is_empty() {
            return Err(AppError::Validation(
                "policy_ids must not be empty".to_owned(),
            ));
        }

        self.find_role_or_not_found(role_id).await?;

        self.repository
            .assign_policies_to_role(role_id, policy_ids)
            .await
    }

    /// Removes one policy from a role. Revoking an unassigned policy is a
    /// no-op, not an error.
    pub async fn revoke_policy(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        policy_id: PolicyId,
    ) -> AppResult<()> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_role_or_not_found(role_id).await?;

        self.repository
            .revoke_policy_from_role(role_id, policy_id)
            .await
    }

    /// Lists the policies assigned to a role.
    pub async fn role_policies(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<Vec<Policy>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_role_or_not_found(role_id).await?;

        self.repository.role_policies(role_id).await
    }

    /// Returns the transitive union of permission keys reachable from a
    /// role through its policies, de-duplicated.
    pub async fn role_effective_permissions(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        self.platform_admin_service
            .require_platform_admin(actor)
            .await?;

        self.find_role_or_not_found(role_id).await?;

        self.repository.role_effective_permissions(role_id).await
    }

    async fn find_role_or_not_found(&self, id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{id}' was not found")))
    }
}
