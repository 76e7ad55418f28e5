use axum::Json;
use axum::extract::{Extension, Query, State};
use warden_core::{TenantId, UserIdentity};
use warden_domain::PermissionKey;

use crate::dto::{
    AuthorizeRequest, AuthorizeResponse, UserPermissionsQuery, UserPermissionsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn authorize_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthorizeRequest>,
) -> ApiResult<Json<AuthorizeResponse>> {
    let key = PermissionKey::new(payload.service, payload.entity, payload.action)?;

    let authorized = state
        .authorization_service
        .authorize(
            TenantId::from_uuid(payload.tenant_id),
            payload.user_id.as_str(),
            &key,
        )
        .await;

    Ok(Json(AuthorizeResponse { authorized }))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<UserPermissionsQuery>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let user_id = query
        .user_id
        .unwrap_or_else(|| user.user_id().to_owned());

    let permissions = state
        .authorization_service
        .user_permissions(TenantId::from_uuid(query.tenant_id), user_id.as_str())
        .await?;

    Ok(Json(UserPermissionsResponse::from(permissions)))
}
