//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_access_request_repository;
mod postgres_org_repository;
mod postgres_role_repository;
mod postgres_user_repository;

pub use postgres_access_request_repository::PostgresAccessRequestRepository;
pub use postgres_org_repository::PostgresOrgRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;
