//! Session issuing service.
//!
//! Every issued session gets a fresh random token and an expiry taken from
//! [`SessionConfig`]. Key-derived sessions are only issued after the
//! presented secret matches the stored hash.

use chrono::Utc;
use hangar_core::api_keys::{hash_api_key, parse_api_key};
use hangar_core::api_session::{generate_session_token, ApiSession, NewApiSession};
use hangar_core::error::CoreError;
use hangar_core::session_config::SessionConfig;
use hangar_core::types::{DbId, Timestamp};
use hangar_db::repositories::{ApiKeyRepo, ApiSessionRepo};
use hangar_db::DbPool;
use subtle::ConstantTimeEq;

use crate::error::{classify_sqlx_error, AuthResult};

/// Message returned for every rejected API key, whatever the reason.
const INVALID_API_KEY: &str = "Invalid API key";

/// Message returned for unknown or expired session tokens.
const INVALID_SESSION: &str = "Invalid or expired session";

/// Issues, resolves, and revokes API sessions.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    pool: DbPool,
    config: SessionConfig,
}

impl SessionIssuer {
    pub fn new(pool: DbPool, config: SessionConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Exchange a plaintext API key (`identifier.secret`) for a session
    /// acting as the key's owner.
    ///
    /// Malformed, unknown and mismatching keys all fail with the same
    /// [`CoreError::Unauthorized`]. A key whose owner was deleted fails with
    /// [`CoreError::InvalidReference`].
    pub async fn issue_for_api_key(&self, presented: &str) -> AuthResult<ApiSession> {
        let parsed = parse_api_key(presented).map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed API key");
            CoreError::Unauthorized(INVALID_API_KEY.into())
        })?;

        let Some(key) = ApiKeyRepo::find_by_identifier(&self.pool, parsed.identifier).await? else {
            tracing::debug!(identifier = %parsed.identifier, "Rejected unknown API key");
            return Err(CoreError::Unauthorized(INVALID_API_KEY.into()).into());
        };

        let presented_hash = hash_api_key(parsed.secret);
        if !bool::from(presented_hash.as_bytes().ct_eq(key.token_hash.as_bytes())) {
            tracing::warn!(key_id = key.id, "Rejected API key with wrong secret");
            return Err(CoreError::Unauthorized(INVALID_API_KEY.into()).into());
        }

        let now = Utc::now();
        let session = NewApiSession::from_api_key(
            generate_session_token(),
            &key,
            self.config.session_expiry_from(now)?,
        )
        .inspect_err(|_| {
            tracing::warn!(key_id = key.id, "Rejected API key without an owner");
        })?;

        self.store(session, now).await
    }

    /// Issue an anonymous session.
    pub async fn issue_public(&self) -> AuthResult<ApiSession> {
        let now = Utc::now();
        let session = NewApiSession::public(
            generate_session_token(),
            self.config.public_session_expiry_from(now)?,
        );
        self.store(session, now).await
    }

    /// Issue a session bound directly to `user_id`.
    pub async fn issue_for_user(&self, user_id: DbId) -> AuthResult<ApiSession> {
        let now = Utc::now();
        let session = NewApiSession::for_user(
            generate_session_token(),
            user_id,
            self.config.session_expiry_from(now)?,
        );
        self.store(session, now).await
    }

    /// Resolve a presented token to its live session.
    ///
    /// Sessions within [`EXPIRY_LEEWAY_SECS`] of expiry are rejected too.
    ///
    /// [`EXPIRY_LEEWAY_SECS`]: hangar_core::api_session::EXPIRY_LEEWAY_SECS
    pub async fn authenticate(&self, token: &str) -> AuthResult<ApiSession> {
        ApiSessionRepo::find_by_token(&self.pool, token)
            .await?
            .ok_or_else(|| CoreError::Unauthorized(INVALID_SESSION.into()).into())
    }

    /// Revoke a single session. Returns `true` if it existed.
    pub async fn revoke(&self, token: &str) -> AuthResult<bool> {
        let Some(revoked) = ApiSessionRepo::revoke(&self.pool, token).await? else {
            tracing::debug!("Revoke requested for unknown API session");
            return Ok(false);
        };

        tracing::info!(
            session_id = revoked.id(),
            kind = revoked.kind().as_str(),
            user_id = ?revoked.user_id(),
            key_id = ?revoked.key_id(),
            "Revoked API session"
        );
        Ok(true)
    }

    /// Revoke every session attributed to `user_id`.
    pub async fn revoke_all_for_user(&self, user_id: DbId) -> AuthResult<u64> {
        let count = ApiSessionRepo::revoke_all_for_user(&self.pool, user_id).await?;
        tracing::info!(user_id, count, "Revoked all API sessions for user");
        Ok(count)
    }

    async fn store(&self, session: NewApiSession, now: Timestamp) -> AuthResult<ApiSession> {
        session.ensure_expires_after(now)?;

        let stored = ApiSessionRepo::create(&self.pool, &session)
            .await
            .map_err(classify_sqlx_error)?;

        tracing::info!(
            session_id = stored.id(),
            kind = stored.kind().as_str(),
            user_id = ?stored.user_id(),
            key_id = ?stored.key_id(),
            expires = %stored.expires(),
            "Issued API session"
        );
        Ok(stored)
    }
}
