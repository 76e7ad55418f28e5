use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_domain::PlatformAdmin;

/// Incoming payload for registering a platform admin.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/create-platform-admin-request.ts"
)]
pub struct CreatePlatformAdminRequest {
    pub user_id: String,
}

/// API representation of a platform admin registry entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/platform-admin-response.ts"
)]
pub struct PlatformAdminResponse {
    pub user_id: String,
    pub created_by: Option<String>,
    pub created_at: String,
}

impl From<PlatformAdmin> for PlatformAdminResponse {
    fn from(value: PlatformAdmin) -> Self {
        Self {
            user_id: value.user_id,
            created_by: value.created_by,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Outcome of a platform admin check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/platform-admin-check-response.ts"
)]
pub struct PlatformAdminCheckResponse {
    pub is_platform_admin: bool,
}
