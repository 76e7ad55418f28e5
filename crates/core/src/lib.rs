//! Shared primitives for all Rust crates in Warden.

#![forbid(unsafe_code)]

/// Authenticated caller primitives shared across services.
pub mod auth;
/// Typed identifiers for persisted resources.
pub mod id;

use thiserror::Error;

pub use auth::UserIdentity;
pub use id::{PermissionId, PolicyId, RoleId, TenantId};

/// Result type used across Warden crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Delete blocked by live references to the resource.
    #[error("referential integrity: {0}")]
    ReferentialIntegrity(String),

    /// Caller identity is missing or could not be established.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backing store could not be reached or answered with a failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
