use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use warden_application::{CreateRoleInput, UpdateRoleInput};
use warden_core::{PolicyId, RoleId, TenantId, UserIdentity};
use warden_domain::RoleKind;

use crate::dto::{
    AssignPoliciesRequest, CreateRoleRequest, ListRolesQuery, PermissionKeyResponse,
    PolicyResponse, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let kind = RoleKind::from_str(payload.kind.as_str())?;

    let role = state
        .rbac_admin_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                kind,
                description: payload.description,
                tenant_id: payload.tenant_id.map(TenantId::from_uuid),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListRolesQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .rbac_admin_service
        .list_roles(&user, query.tenant_id.map(TenantId::from_uuid))
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .get_role(&user, RoleId::from_uuid(id))
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .rbac_admin_service
        .update_role(
            &user,
            RoleId::from_uuid(id),
            UpdateRoleInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_role(&user, RoleId::from_uuid(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_policies_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPoliciesRequest>,
) -> ApiResult<StatusCode> {
    let policy_ids: Vec<PolicyId> = payload
        .policy_ids
        .into_iter()
        .map(PolicyId::from_uuid)
        .collect();

    state
        .rbac_admin_service
        .assign_policies(&user, RoleId::from_uuid(id), policy_ids.as_slice())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_policy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((id, policy_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .revoke_policy(&user, RoleId::from_uuid(id), PolicyId::from_uuid(policy_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn role_policies_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PolicyResponse>>> {
    let policies = state
        .rbac_admin_service
        .role_policies(&user, RoleId::from_uuid(id))
        .await?
        .into_iter()
        .map(PolicyResponse::from)
        .collect();

    Ok(Json(policies))
}

pub async fn role_effective_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PermissionKeyResponse>>> {
    let permissions = state
        .rbac_admin_service
        .role_effective_permissions(&user, RoleId::from_uuid(id))
        .await?
        .into_iter()
        .map(PermissionKeyResponse::from)
        .collect();

    Ok(Json(permissions))
}
