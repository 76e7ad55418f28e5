use std::collections::BTreeSet;
use std::sync::Arc;

use warden_core::{AppResult, TenantId};
use warden_domain::{MembershipStatus, PermissionKey};

use crate::{AuthorizationRepository, PlatformAdminRepository};

/// Outcome of an access check together with the reason it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Caller holds a platform admin registry entry; allowed everywhere.
    PlatformAdmin,
    /// The membership role grants the requested permission.
    Granted,
    /// No active membership binds the user to the tenant.
    NotAMember,
    /// The membership role does not grant the requested permission.
    PermissionDenied,
}

impl AccessDecision {
    /// Returns whether the decision allows the request.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::Granted)
    }
}

/// Effective permission set resolved for one user in one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPermissions {
    /// Platform admins hold every permission; the catalog is unbounded, so
    /// the set is never enumerated.
    Unrestricted,
    /// Permissions granted through the membership role; empty when the user
    /// has no active membership.
    Granted(BTreeSet<PermissionKey>),
}

/// Read-only resolver turning `(user, tenant, permission)` into a decision.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    platform_admin_repository: Arc<dyn PlatformAdminRepository>,
}

impl AuthorizationService {
    /// Creates a resolver from its read-side repositories.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        platform_admin_repository: Arc<dyn PlatformAdminRepository>,
    ) -> Self {
        Self {
            repository,
            platform_admin_repository,
        }
    }

    /// Resolves an access check to a decision.
    ///
    /// The platform admin lookup is the only short-circuit; every other path
    /// walks membership → role → policies → permissions.
    pub async fn check_access(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        key: &PermissionKey,
    ) -> AppResult<AccessDecision> {
        if self
            .platform_admin_repository
            .is_platform_admin(user_id)
            .await?
        {
            return Ok(AccessDecision::PlatformAdmin);
        }

        let Some(membership) = self.repository.find_membership(tenant_id, user_id).await? else {
            return Ok(AccessDecision::NotAMember);
        };

        if membership.status != MembershipStatus::Active {
            return Ok(AccessDecision::NotAMember);
        }

        let permissions = self
            .repository
            .role_effective_permissions(membership.role_id)
            .await?;

        if permissions.contains(key) {
            Ok(AccessDecision::Granted)
        } else {
            Ok(AccessDecision::PermissionDenied)
        }
    }

    /// Boolean surface consumed by request middleware.
    ///
    /// Denial is a normal outcome, never an error. Storage failures are
    /// logged and mapped to deny so that an unreachable store can never
    /// grant access.
    pub async fn authorize(&self, tenant_id: TenantId, user_id: &str, key: &PermissionKey) -> bool {
        match self.check_access(tenant_id, user_id, key).await {
            Ok(decision) => decision.is_allowed(),
            Err(error) => {
                tracing::error!(
                    %tenant_id,
                    user_id,
                    permission = %key,
                    %error,
                    "authorization check failed, denying"
                );
                false
            }
        }
    }

    /// Resolves the full permission set for a user in a tenant, used to
    /// drive UI capability checks.
    pub async fn user_permissions(
        &self,
        tenant_id: TenantId,
        user_id: &str,
    ) -> AppResult<UserPermissions> {
        if self
            .platform_admin_repository
            .is_platform_admin(user_id)
            .await?
        {
            return Ok(UserPermissions::Unrestricted);
        }

        let Some(membership) = self.repository.find_membership(tenant_id, user_id).await? else {
            return Ok(UserPermissions::Granted(BTreeSet::new()));
        };

        if membership.status != MembershipStatus::Active {
            return Ok(UserPermissions::Granted(BTreeSet::new()));
        }

        let permissions = self
            .repository
            .role_effective_permissions(membership.role_id)
            .await?;

        Ok(UserPermissions::Granted(permissions))
    }
}
