//! Application services and ports for the Warden access-control engine.

#![forbid(unsafe_code)]

mod authorization_service;
mod membership_service;
mod platform_admin_service;
mod rbac_admin_service;
mod rbac_ports;

pub use authorization_service::{AccessDecision, AuthorizationService, UserPermissions};
pub use membership_service::MembershipService;
pub use platform_admin_service::PlatformAdminService;
pub use rbac_admin_service::RbacAdminService;
pub use rbac_ports::{
    AddMemberInput, AuthorizationRepository, CreatePermissionInput, CreatePolicyInput,
    CreateRoleInput, MembershipRepository, PlatformAdminRepository, RbacRepository,
    UpdateMemberInput, UpdatePolicyInput, UpdateRoleInput,
};
