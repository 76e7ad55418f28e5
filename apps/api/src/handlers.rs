//! HTTP handlers for the Warden API.

pub mod authz;
pub mod health;
pub mod members;
pub mod permissions;
pub mod platform_admins;
pub mod policies;
pub mod roles;
