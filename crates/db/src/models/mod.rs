//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! the DTO used for inserts.

pub mod api_key;
pub mod api_session;
