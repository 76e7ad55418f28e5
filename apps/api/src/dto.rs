//! Transport types for the HTTP API.

mod authz;
mod members;
mod platform_admins;
mod rbac;

pub use authz::{
    AuthorizeRequest, AuthorizeResponse, PermissionKeyResponse, UserPermissionsQuery,
    UserPermissionsResponse,
};
pub use members::{AddMemberRequest, MemberResponse, UpdateMemberRequest};
pub use platform_admins::{
    CreatePlatformAdminRequest, PlatformAdminCheckResponse, PlatformAdminResponse,
};
pub use rbac::{
    AssignPermissionsRequest, AssignPoliciesRequest, CreatePermissionRequest, CreatePolicyRequest,
    CreateRoleRequest, ListPermissionsQuery, ListPoliciesQuery, ListRolesQuery,
    PermissionResponse, PolicyResponse, RoleResponse, UpdatePolicyRequest, UpdateRoleRequest,
};
