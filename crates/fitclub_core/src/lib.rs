//! Core domain logic for the FitClub gym backend.
//! This crate is the single source of truth for membership, catalog and
//! access invariants.

pub mod access;
pub mod api;
pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{AccessError, Action, Principal, Resource, Role};
pub use api::{decode_body, ApiContext, ApiError, ApiResult, ErrorBody};
pub use auth::{authenticate, hash_password, verify_password, AuthError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::validation::{FieldError, ValidationErrors};
pub use repo::{ListQuery, MemberListQuery, RepoError, RepoResult, SqliteRepository};
pub use service::catalog_service::CatalogService;
pub use service::member_service::{MemberProfile, MemberService};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
