//! Storage adapters for the Warden access-control engine.

#![forbid(unsafe_code)]

mod in_memory_authorization_repository;
mod in_memory_membership_repository;
mod in_memory_platform_admin_repository;
mod in_memory_rbac_repository;
mod in_memory_store;
mod postgres_authorization_repository;
mod postgres_membership_repository;
mod postgres_platform_admin_repository;
mod postgres_rbac_repository;
mod postgres_support;

pub use in_memory_authorization_repository::InMemoryAuthorizationRepository;
pub use in_memory_membership_repository::InMemoryMembershipRepository;
pub use in_memory_platform_admin_repository::InMemoryPlatformAdminRepository;
pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use in_memory_store::InMemoryStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_platform_admin_repository::PostgresPlatformAdminRepository;
pub use postgres_rbac_repository::PostgresRbacRepository;
