use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use warden_core::{AppError, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the upstream-verified user id.
///
/// The gateway in front of this service authenticates every request and
/// forwards the subject here; the engine itself never checks credentials.
pub const USER_ID_HEADER: &str = "x-authenticated-user";

pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?
        .to_owned();

    request.extensions_mut().insert(UserIdentity::new(user_id));
    Ok(next.run(request).await)
}

pub async fn require_platform_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = request
        .extensions()
        .get::<UserIdentity>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    state
        .platform_admin_service
        .require_platform_admin(&identity)
        .await?;

    Ok(next.run(request).await)
}
