//! Issuing and resolving API sessions.
//!
//! - [`issuer`] -- turns an API key, a user, or nothing into a stored session
//!   and resolves presented tokens.
//! - [`error`] -- error type shared by the issuer's operations.

pub mod error;
pub mod issuer;

pub use error::{AuthError, AuthResult};
pub use issuer::SessionIssuer;
