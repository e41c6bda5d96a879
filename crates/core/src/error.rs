use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A referenced entity is missing a relation the operation depends on,
    /// e.g. an API key whose owner has been removed.
    #[error("Invalid reference: {entity} {id} has no {missing}")]
    InvalidReference {
        entity: &'static str,
        id: DbId,
        missing: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
