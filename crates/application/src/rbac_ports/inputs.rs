use warden_core::{RoleId, TenantId};
use warden_domain::{MembershipStatus, RoleKind};

/// Input payload for creating a catalog permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Service part of the permission key.
    pub service: String,
    /// Entity part of the permission key.
    pub entity: String,
    /// Action part of the permission key.
    pub action: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}

/// Input payload for creating a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePolicyInput {
    /// Policy name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` creates a system-level policy.
    pub tenant_id: Option<TenantId>,
}

/// Input payload for updating a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicyInput {
    /// New policy name, when present.
    pub name: Option<String>,
    /// New description, when present.
    pub description: Option<String>,
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name.
    pub name: String,
    /// Scope in which the role may be held.
    pub kind: RoleKind,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Owning tenant; `None` creates a system-level role.
    pub tenant_id: Option<TenantId>,
}

/// Input payload for updating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name, when present.
    pub name: Option<String>,
    /// New description, when present.
    pub description: Option<String>,
}

/// Input payload for adding a tenant member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberInput {
    /// Upstream-verified user id to add.
    pub user_id: String,
    /// Role the membership will hold.
    pub role_id: RoleId,
}

/// Input payload for updating a tenant member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMemberInput {
    /// New role, when present.
    pub role_id: Option<RoleId>,
    /// New lifecycle status, when present.
    pub status: Option<MembershipStatus>,
}
