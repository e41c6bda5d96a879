//! API key model and DTOs.

use hangar_core::api_session::ApiKeyIdentity;
use hangar_core::types::{DbId, RowMeta, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `api_keys` table.
///
/// **Note:** `token_hash` is never serialized to responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub created_at: Timestamp,
    pub name: String,
    /// Cleared when the owning account is deleted.
    pub owner_id: Option<DbId>,
    pub token_identifier: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
}

impl ApiKey {
    pub fn meta(&self) -> RowMeta {
        RowMeta {
            id: self.id,
            created_at: self.created_at,
        }
    }
}

impl ApiKeyIdentity for ApiKey {
    fn key_id(&self) -> DbId {
        self.id
    }

    fn owner_id(&self) -> Option<DbId> {
        self.owner_id
    }
}

/// DTO for creating a new API key.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKey {
    pub name: String,
    pub owner_id: DbId,
    pub token_identifier: Uuid,
    pub token_hash: String,
}
