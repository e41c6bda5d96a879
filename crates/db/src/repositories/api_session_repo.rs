//! Repository for the `api_sessions` table.
//!
//! Rows are never updated: revocation and expiry both delete the row.

use hangar_core::api_session::{ApiSession, NewApiSession, EXPIRY_LEEWAY_SECS};
use hangar_core::types::DbId;
use sqlx::PgPool;

use crate::models::api_session::ApiSessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, token, key_id, user_id, expires";

/// Predicate for sessions that are live: not expiring within the next
/// [`EXPIRY_LEEWAY_SECS`], bound as `$2`.
const LIVE: &str = "expires > NOW() + make_interval(secs => $2)";

/// Provides create, lookup, and delete operations for API sessions.
pub struct ApiSessionRepo;

impl ApiSessionRepo {
    /// Insert a new session. The database assigns `id` and `created_at`.
    ///
    /// A duplicate token fails with a unique violation on
    /// `uq_api_sessions_token`.
    pub async fn create(pool: &PgPool, input: &NewApiSession) -> Result<ApiSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_sessions (token, key_id, user_id, expires)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiSessionRow>(&query)
            .bind(input.token())
            .bind(input.key_id())
            .bind(input.user_id())
            .bind(input.expires())
            .fetch_one(pool)
            .await?
            .into_session()
    }

    /// Find a live session by its token.
    ///
    /// Sessions within [`EXPIRY_LEEWAY_SECS`] of expiry count as expired.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<ApiSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_sessions
             WHERE token = $1
               AND {LIVE}"
        );
        sqlx::query_as::<_, ApiSessionRow>(&query)
            .bind(token)
            .bind(EXPIRY_LEEWAY_SECS as f64)
            .fetch_optional(pool)
            .await?
            .map(ApiSessionRow::into_session)
            .transpose()
    }

    /// Find a session by ID regardless of expiry.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApiSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_sessions WHERE id = $1");
        sqlx::query_as::<_, ApiSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(ApiSessionRow::into_session)
            .transpose()
    }

    /// List a user's live sessions, both user-bound and key-derived, newest first.
    ///
    /// Uses the same liveness rule as [`Self::find_by_token`].
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ApiSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_sessions
             WHERE user_id = $1
               AND {LIVE}
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ApiSessionRow>(&query)
            .bind(user_id)
            .bind(EXPIRY_LEEWAY_SECS as f64)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(ApiSessionRow::into_session)
            .collect()
    }

    /// Revoke a single session, returning the deleted row if there was one.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<Option<ApiSession>, sqlx::Error> {
        let query = format!("DELETE FROM api_sessions WHERE token = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ApiSessionRow>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await?
            .map(ApiSessionRow::into_session)
            .transpose()
    }

    /// Revoke all sessions for a user. Returns the count of revoked sessions.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Revoke all sessions derived from an API key.
    pub async fn revoke_all_for_key(pool: &PgPool, key_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_sessions WHERE key_id = $1")
            .bind(key_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_sessions WHERE expires <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
