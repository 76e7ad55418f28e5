use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, RoleId, TenantId};

/// Lifecycle status of a tenant membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Invitation sent, not yet accepted.
    Pending,
    /// Member in good standing; the only status the resolver grants through.
    Active,
    /// Suspended member.
    Inactive,
}

impl MembershipStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown membership status '{value}'"
            ))),
        }
    }
}

/// Binding of a user to a tenant with exactly one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantMembership {
    /// Tenant the user belongs to.
    pub tenant_id: TenantId,
    /// Upstream-verified user id.
    pub user_id: String,
    /// The single role held through this membership.
    pub role_id: RoleId,
    /// Lifecycle status.
    pub status: MembershipStatus,
    /// User id of the actor that added this member, when known.
    pub invited_by: Option<String>,
    /// Timestamp the membership was created.
    pub joined_at: DateTime<Utc>,
}
