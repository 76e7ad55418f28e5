use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use warden_application::CreatePermissionInput;
use warden_core::{PermissionId, UserIdentity};

use crate::dto::{CreatePermissionRequest, ListPermissionsQuery, PermissionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .rbac_admin_service
        .create_permission(
            &user,
            CreatePermissionInput {
                service: payload.service,
                entity: payload.entity,
                action: payload.action,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListPermissionsQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_admin_service
        .list_permissions(&user, query.service.as_deref())
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .rbac_admin_service
        .get_permission(&user, PermissionId::from_uuid(id))
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_permission(&user, PermissionId::from_uuid(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
