//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod api_key_repo;
pub mod api_session_repo;

pub use api_key_repo::ApiKeyRepo;
pub use api_session_repo::ApiSessionRepo;
