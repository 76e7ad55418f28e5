use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use warden_application::{CreatePolicyInput, UpdatePolicyInput};
use warden_core::{PermissionId, PolicyId, TenantId, UserIdentity};

use crate::dto::{
    AssignPermissionsRequest, CreatePolicyRequest, ListPoliciesQuery, PermissionKeyResponse,
    PolicyResponse, UpdatePolicyRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePolicyRequest>,
) -> ApiResult<(StatusCode, Json<PolicyResponse>)> {
    let policy = state
        .rbac_admin_service
        .create_policy(
            &user,
            CreatePolicyInput {
                name: payload.name,
                description: payload.description,
                tenant_id: payload.tenant_id.map(TenantId::from_uuid),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PolicyResponse::from(policy))))
}

pub async fn list_policies_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListPoliciesQuery>,
) -> ApiResult<Json<Vec<PolicyResponse>>> {
    let policies = state
        .rbac_admin_service
        .list_policies(&user, query.tenant_id.map(TenantId::from_uuid))
        .await?
        .into_iter()
        .map(PolicyResponse::from)
        .collect();

    Ok(Json(policies))
}

pub async fn get_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .rbac_admin_service
        .get_policy(&user, PolicyId::from_uuid(id))
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}

pub async fn update_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePolicyRequest>,
) -> ApiResult<Json<PolicyResponse>> {
    let policy = state
        .rbac_admin_service
        .update_policy(
            &user,
            PolicyId::from_uuid(id),
            UpdatePolicyInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(PolicyResponse::from(policy)))
}

pub async fn delete_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_policy(&user, PolicyId::from_uuid(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPermissionsRequest>,
) -> ApiResult<StatusCode> {
    let permission_ids: Vec<PermissionId> = payload
        .permission_ids
        .into_iter()
        .map(PermissionId::from_uuid)
        .collect();

    state
        .rbac_admin_service
        .assign_permissions(&user, PolicyId::from_uuid(id), permission_ids.as_slice())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .revoke_permission(
            &user,
            PolicyId::from_uuid(id),
            PermissionId::from_uuid(permission_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn policy_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PermissionKeyResponse>>> {
    let permissions = state
        .rbac_admin_service
        .policy_permissions(&user, PolicyId::from_uuid(id))
        .await?
        .into_iter()
        .map(PermissionKeyResponse::from)
        .collect();

    Ok(Json(permissions))
}
