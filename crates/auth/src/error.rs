use hangar_core::error::CoreError;

/// Error type for session issuing and lookup.
///
/// Wraps [`CoreError`] for domain errors and [`sqlx::Error`] for storage
/// failures that have no domain meaning.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error to a domain error where one applies.
///
/// Unique violations on constraints named `uq_*` become
/// [`CoreError::Conflict`]; everything else stays a database error.
pub fn classify_sqlx_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return AuthError::Core(CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                )));
            }
        }
    }
    AuthError::Database(err)
}
