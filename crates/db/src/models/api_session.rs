//! API session row mapping.
//!
//! The table stores `key_id` and `user_id` as nullable columns; the domain
//! type [`ApiSession`] only admits the three valid combinations, so rows are
//! converted with a checked step.

use hangar_core::api_session::ApiSession;
use hangar_core::error::CoreError;
use hangar_core::types::{DbId, RowMeta, Timestamp};
use sqlx::FromRow;

/// A row from the `api_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApiSessionRow {
    pub id: DbId,
    pub created_at: Timestamp,
    pub token: String,
    pub key_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub expires: Timestamp,
}

impl TryFrom<ApiSessionRow> for ApiSession {
    type Error = CoreError;

    fn try_from(row: ApiSessionRow) -> Result<Self, Self::Error> {
        ApiSession::from_parts(
            RowMeta {
                id: row.id,
                created_at: row.created_at,
            },
            row.token,
            row.key_id,
            row.user_id,
            row.expires,
        )
    }
}

impl ApiSessionRow {
    /// Convert into the domain type, reporting a malformed row as a decode
    /// error so repository signatures stay `Result<_, sqlx::Error>`.
    pub fn into_session(self) -> Result<ApiSession, sqlx::Error> {
        ApiSession::try_from(self).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }
}
