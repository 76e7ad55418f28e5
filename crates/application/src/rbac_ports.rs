//! Ports and request payloads for the access-control services.

mod inputs;
mod repositories;

pub use inputs::{
    AddMemberInput, CreatePermissionInput, CreatePolicyInput, CreateRoleInput, UpdateMemberInput,
    UpdatePolicyInput, UpdateRoleInput,
};
pub use repositories::{
    AuthorizationRepository, MembershipRepository, PlatformAdminRepository, RbacRepository,
};
