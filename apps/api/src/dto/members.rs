use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use warden_domain::TenantMembership;

/// Incoming payload for adding a tenant member.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/add-member-request.ts"
)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role_id: Uuid,
}

/// Incoming payload for member updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../packages/api-types/src/generated/update-member-request.ts"
)]
pub struct UpdateMemberRequest {
    pub role_id: Option<Uuid>,
    pub status: Option<String>,
}

/// API representation of a tenant membership.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../packages/api-types/src/generated/member-response.ts")]
pub struct MemberResponse {
    pub tenant_id: Uuid,
    pub user_id: String,
    pub role_id: Uuid,
    pub status: String,
    pub invited_by: Option<String>,
    pub joined_at: String,
}

impl From<TenantMembership> for MemberResponse {
    fn from(value: TenantMembership) -> Self {
        Self {
            tenant_id: value.tenant_id.as_uuid(),
            user_id: value.user_id,
            role_id: value.role_id.as_uuid(),
            status: value.status.as_str().to_owned(),
            invited_by: value.invited_by,
            joined_at: value.joined_at.to_rfc3339(),
        }
    }
}
