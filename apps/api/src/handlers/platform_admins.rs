use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use warden_core::UserIdentity;

use crate::dto::{
    CreatePlatformAdminRequest, PlatformAdminCheckResponse, PlatformAdminResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_admin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePlatformAdminRequest>,
) -> ApiResult<(StatusCode, Json<PlatformAdminResponse>)> {
    let admin = state
        .platform_admin_service
        .create_admin(&user, payload.user_id.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(PlatformAdminResponse::from(admin))))
}

pub async fn list_admins_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PlatformAdminResponse>>> {
    let admins = state
        .platform_admin_service
        .list_admins(&user)
        .await?
        .into_iter()
        .map(PlatformAdminResponse::from)
        .collect();

    Ok(Json(admins))
}

pub async fn get_admin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PlatformAdminResponse>> {
    let admin = state
        .platform_admin_service
        .get_admin(&user, user_id.as_str())
        .await?;

    Ok(Json(PlatformAdminResponse::from(admin)))
}

pub async fn delete_admin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .platform_admin_service
        .delete_admin(&user, user_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_admin_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<PlatformAdminCheckResponse>> {
    let is_platform_admin = state
        .platform_admin_service
        .is_platform_admin(user.user_id())
        .await?;

    Ok(Json(PlatformAdminCheckResponse { is_platform_admin }))
}
