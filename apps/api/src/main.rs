//! Warden API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_application::{
    AuthorizationService, MembershipService, PlatformAdminService, RbacAdminService,
};
use warden_core::AppError;
use warden_infrastructure::{
    PostgresAuthorizationRepository, PostgresMembershipRepository,
    PostgresPlatformAdminRepository, PostgresRbacRepository,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = env::args().nth(1);

    let database_url = required_env("DATABASE_URL")?;
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    let platform_admin_repository = Arc::new(PostgresPlatformAdminRepository::new(pool.clone()));
    let platform_admin_service = PlatformAdminService::new(platform_admin_repository.clone());

    match command.as_deref() {
        Some("migrate") => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        // The first admin must exist before any mutation endpoint is usable;
        // this is the out-of-band bootstrap path.
        Some("grant-platform-admin") => {
            let user_id = env::args().nth(2).ok_or_else(|| {
                AppError::Validation("grant-platform-admin requires a user id".to_owned())
            })?;
            let admin = platform_admin_service
                .bootstrap_admin(user_id.as_str())
                .await?;
            info!(user_id = admin.user_id, "platform admin granted");
            return Ok(());
        }
        Some(other) => {
            return Err(AppError::Validation(format!("unknown command '{other}'")));
        }
        None => {}
    }

    let rbac_repository = Arc::new(PostgresRbacRepository::new(pool.clone()));
    let membership_repository = Arc::new(PostgresMembershipRepository::new(pool.clone()));
    let authorization_repository = Arc::new(PostgresAuthorizationRepository::new(pool.clone()));

    let authorization_service = AuthorizationService::new(
        authorization_repository,
        platform_admin_repository.clone(),
    );
    let rbac_admin_service =
        RbacAdminService::new(rbac_repository.clone(), platform_admin_service.clone());
    let membership_service = MembershipService::new(
        membership_repository,
        rbac_repository,
        platform_admin_service.clone(),
    );

    let app_state = AppState {
        authorization_service,
        rbac_admin_service,
        membership_service,
        platform_admin_service,
    };

    let platform_routes = Router::new()
        .route(
            "/api/platform/admins",
            get(handlers::platform_admins::list_admins_handler)
                .post(handlers::platform_admins::create_admin_handler),
        )
        .route(
            "/api/platform/admins/{user_id}",
            get(handlers::platform_admins::get_admin_handler)
                .delete(handlers::platform_admins::delete_admin_handler),
        )
        .route(
            "/api/platform/permissions",
            get(handlers::permissions::list_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/api/platform/permissions/{id}",
            get(handlers::permissions::get_permission_handler)
                .delete(handlers::permissions::delete_permission_handler),
        )
        .route(
            "/api/platform/policies",
            get(handlers::policies::list_policies_handler)
                .post(handlers::policies::create_policy_handler),
        )
        .route(
            "/api/platform/policies/{id}",
            get(handlers::policies::get_policy_handler)
                .patch(handlers::policies::update_policy_handler)
                .delete(handlers::policies::delete_policy_handler),
        )
        .route(
            "/api/platform/policies/{id}/permissions",
            get(handlers::policies::policy_permissions_handler)
                .post(handlers::policies::assign_permissions_handler),
        )
        .route(
            "/api/platform/policies/{id}/permissions/{permission_id}",
            delete(handlers::policies::revoke_permission_handler),
        )
        .route(
            "/api/platform/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/platform/roles/{id}",
            get(handlers::roles::get_role_handler)
                .patch(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/platform/roles/{id}/policies",
            get(handlers::roles::role_policies_handler)
                .post(handlers::roles::assign_policies_handler),
        )
        .route(
            "/api/platform/roles/{id}/policies/{policy_id}",
            delete(handlers::roles::revoke_policy_handler),
        )
        .route(
            "/api/platform/roles/{id}/permissions",
            get(handlers::roles::role_effective_permissions_handler),
        )
        .route(
            "/api/platform/tenants/{tenant_id}/members",
            get(handlers::members::list_members_handler)
                .post(handlers::members::add_member_handler),
        )
        .route(
            "/api/platform/tenants/{tenant_id}/members/{user_id}",
            get(handlers::members::get_member_handler)
                .patch(handlers::members::update_member_handler)
                .delete(handlers::members::remove_member_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_platform_admin,
        ));

    let protected_routes = Router::new()
        .route("/api/authorize", post(handlers::authz::authorize_handler))
        .route(
            "/api/permissions/user",
            get(handlers::authz::user_permissions_handler),
        )
        .route(
            "/api/platform/admins/check",
            get(handlers::platform_admins::check_admin_handler),
        )
        .merge(platform_routes)
        .route_layer(from_fn(middleware::require_identity));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::USER_ID_HEADER),
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "warden-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
