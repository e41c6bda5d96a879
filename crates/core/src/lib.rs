//! Domain types for API authentication sessions.
//!
//! This crate has no internal dependencies and performs no I/O so it can be
//! shared by the repository layer, the session issuer and any future tooling.

pub mod api_keys;
pub mod api_session;
pub mod error;
pub mod session_config;
pub mod types;
