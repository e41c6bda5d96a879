//! Repository for the `api_keys` table.

use hangar_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::api_key::{ApiKey, CreateApiKey};

const COLUMNS: &str = "id, created_at, name, owner_id, token_identifier, token_hash";

/// Provides CRUD operations for API keys.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// Insert a new API key, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateApiKey) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys (name, owner_id, token_identifier, token_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(&input.name)
            .bind(input.owner_id)
            .bind(input.token_identifier)
            .bind(&input.token_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an API key by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE id = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an API key by the identifier part of its plaintext form.
    ///
    /// The caller is responsible for comparing `token_hash` against the
    /// presented secret.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: Uuid,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE token_identifier = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// List all keys owned by a user, newest first.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_keys WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an API key. Sessions derived from it are removed by cascade.
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
