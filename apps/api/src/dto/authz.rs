use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use warden_application::UserPermissions;
use warden_domain::PermissionKey;

/// Incoming payload for an authorization check.
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../../packages/api-types/src/generated/authorize-request.ts")]
pub struct AuthorizeRequest {
    pub tenant_id: Uuid,
    pub user_id: String,
    pub service: String,
    pub entity: String,
    pub action: String,
}

/// Outcome of an authorization check.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../packages/api-types/src/generated/authorize-response.ts")]
pub struct AuthorizeResponse {
    pub authorized: bool,
}

/// Query parameters for the user permission listing.
#[derive(Debug, Deserialize)]
pub struct UserPermissionsQuery {
    pub tenant_id: Uuid,
    /// Defaults to the authenticated caller when absent.
    pub user_id: Option<String>,
}

/// API representation of one permission key.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/permission-key-response.ts"
)]
pub struct PermissionKeyResponse {
    pub service: String,
    pub entity: String,
    pub action: String,
}

impl From<PermissionKey> for PermissionKeyResponse {
    fn from(value: PermissionKey) -> Self {
        Self {
            service: value.service().to_owned(),
            entity: value.entity().to_owned(),
            action: value.action().to_owned(),
        }
    }
}

/// Effective permission set for a user in a tenant.
///
/// Platform admins are reported through the `unrestricted` flag instead of
/// an enumeration, which would grow without bound with the catalog.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/user-permissions-response.ts"
)]
pub struct UserPermissionsResponse {
    pub unrestricted: bool,
    pub permissions: Vec<PermissionKeyResponse>,
}

impl From<UserPermissions> for UserPermissionsResponse {
    fn from(value: UserPermissions) -> Self {
        match value {
            UserPermissions::Unrestricted => Self {
                unrestricted: true,
                permissions: Vec::new(),
            },
            UserPermissions::Granted(permissions) => Self {
                unrestricted: false,
                permissions: permissions
                    .into_iter()
                    .map(PermissionKeyResponse::from)
                    .collect(),
            },
        }
    }
}
