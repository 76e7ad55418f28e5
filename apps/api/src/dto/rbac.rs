use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use warden_domain::{Permission, Policy, Role};

/// Incoming payload for catalog permission creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub service: String,
    pub entity: String,
    pub action: String,
    pub description: Option<String>,
}

/// Query parameters for the permission listing.
#[derive(Debug, Deserialize)]
pub struct ListPermissionsQuery {
    pub service: Option<String>,
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: Uuid,
    pub service: String,
    pub entity: String,
    pub action: String,
    pub key: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id.as_uuid(),
            service: value.key.service().to_owned(),
            entity: value.key.entity().to_owned(),
            action: value.key.action().to_owned(),
            key: value.key.to_string(),
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for policy creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/create-policy-request.ts"
)]
pub struct CreatePolicyRequest {
    pub name: String,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
}

/// Incoming payload for policy updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/update-policy-request.ts"
)]
pub struct UpdatePolicyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for the policy listing.
#[derive(Debug, Deserialize)]
pub struct ListPoliciesQuery {
    pub tenant_id: Option<Uuid>,
}

/// API representation of a policy.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../packages/api-types/src/generated/policy-response.ts")]
pub struct PolicyResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub is_system: bool,
    pub created_at: String,
}

impl From<Policy> for PolicyResponse {
    fn from(value: Policy) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            description: value.description,
            tenant_id: value.tenant_id.map(|tenant_id| tenant_id.as_uuid()),
            is_system: value.is_system,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for batch permission assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/assign-permissions-request.ts"
)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
}

/// Incoming payload for role updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for the role listing.
#[derive(Debug, Deserialize)]
pub struct ListRolesQuery {
    pub tenant_id: Option<Uuid>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../packages/api-types/src/generated/role-response.ts")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub is_system: bool,
    pub created_at: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            kind: value.kind.as_str().to_owned(),
            description: value.description,
            tenant_id: value.tenant_id.map(|tenant_id| tenant_id.as_uuid()),
            is_system: value.is_system,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for batch policy assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/assign-policies-request.ts"
)]
pub struct AssignPoliciesRequest {
    pub policy_ids: Vec<Uuid>,
}
