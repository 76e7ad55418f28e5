use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use warden_application::{AddMemberInput, UpdateMemberInput};
use warden_core::{RoleId, TenantId, UserIdentity};
use warden_domain::MembershipStatus;

use crate::dto::{AddMemberRequest, MemberResponse, UpdateMemberRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn add_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let membership = state
        .membership_service
        .add_member(
            &user,
            TenantId::from_uuid(tenant_id),
            AddMemberInput {
                user_id: payload.user_id,
                role_id: RoleId::from_uuid(payload.role_id),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(membership))))
}

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = state
        .membership_service
        .list_members(&user, TenantId::from_uuid(tenant_id))
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn get_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((tenant_id, member_user_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<MemberResponse>> {
    let membership = state
        .membership_service
        .get_member(
            &user,
            TenantId::from_uuid(tenant_id),
            member_user_id.as_str(),
        )
        .await?;

    Ok(Json(MemberResponse::from(membership)))
}

pub async fn update_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((tenant_id, member_user_id)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let status = payload
        .status
        .as_deref()
        .map(MembershipStatus::from_str)
        .transpose()?;

    let membership = state
        .membership_service
        .update_member(
            &user,
            TenantId::from_uuid(tenant_id),
            member_user_id.as_str(),
            UpdateMemberInput {
                role_id: payload.role_id.map(RoleId::from_uuid),
                status,
            },
        )
        .await?;

    Ok(Json(MemberResponse::from(membership)))
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((tenant_id, member_user_id)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    state
        .membership_service
        .remove_member(
            &user,
            TenantId::from_uuid(tenant_id),
            member_user_id.as_str(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
