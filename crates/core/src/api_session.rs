//! API session domain model.
//!
//! A session is created along exactly one of three paths (derived from an API
//! key, anonymous public access, or a logged-in user) and is never mutated
//! afterwards. The path is captured by [`SessionKind`], so a session carrying
//! a key reference without a user cannot be represented.

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, RowMeta, Timestamp};

/// Sessions expiring within this many seconds are treated as expired, so a
/// token does not lapse half-way through a request.
pub const EXPIRY_LEEWAY_SECS: i64 = 10;

// ---------------------------------------------------------------------------
// API key seam
// ---------------------------------------------------------------------------

/// The parts of an API key a session is derived from.
pub trait ApiKeyIdentity {
    fn key_id(&self) -> DbId;

    /// `None` once the owning account has been removed.
    fn owner_id(&self) -> Option<DbId>;
}

// ---------------------------------------------------------------------------
// Session kind
// ---------------------------------------------------------------------------

/// Who a session's access is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type")]
pub enum SessionKind {
    /// Derived from an API key; acts on behalf of the key's owner.
    #[serde(rename = "key")]
    FromApiKey { key_id: DbId, user_id: DbId },
    /// Anonymous, rate-limited access.
    #[serde(rename = "public")]
    Public,
    /// Established by a user directly, without an API key.
    #[serde(rename = "user")]
    UserBound { user_id: DbId },
}

impl SessionKind {
    pub fn key_id(&self) -> Option<DbId> {
        match self {
            SessionKind::FromApiKey { key_id, .. } => Some(*key_id),
            SessionKind::Public | SessionKind::UserBound { .. } => None,
        }
    }

    pub fn user_id(&self) -> Option<DbId> {
        match self {
            SessionKind::FromApiKey { user_id, .. } | SessionKind::UserBound { user_id } => {
                Some(*user_id)
            }
            SessionKind::Public => None,
        }
    }

    /// Label reported to API clients next to the token.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::FromApiKey { .. } => "key",
            SessionKind::Public => "public",
            SessionKind::UserBound { .. } => "user",
        }
    }

    /// Rebuild the kind from the nullable `key_id` / `user_id` columns.
    ///
    /// A key reference without a user is never written, so reading one back
    /// means the row was modified outside this crate.
    pub fn from_columns(key_id: Option<DbId>, user_id: Option<DbId>) -> Result<Self, CoreError> {
        match (key_id, user_id) {
            (Some(key_id), Some(user_id)) => Ok(SessionKind::FromApiKey { key_id, user_id }),
            (None, Some(user_id)) => Ok(SessionKind::UserBound { user_id }),
            (None, None) => Ok(SessionKind::Public),
            (Some(key_id), None) => Err(CoreError::Internal(format!(
                "api session references key {key_id} but has no user"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Unsaved session
// ---------------------------------------------------------------------------

/// A session that has not been stored yet.
///
/// Fields are private: every value is built through [`Self::from_api_key`],
/// [`Self::public`] or [`Self::for_user`]. Changing an attribute means
/// building a new value and replacing the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewApiSession {
    token: String,
    #[serde(flatten)]
    kind: SessionKind,
    expires: Timestamp,
}

impl NewApiSession {
    /// Session attributed to `api_key` and acting as its owner.
    ///
    /// Fails with [`CoreError::InvalidReference`] if the key has no owner.
    pub fn from_api_key(
        token: impl Into<String>,
        api_key: &impl ApiKeyIdentity,
        expires: Timestamp,
    ) -> Result<Self, CoreError> {
        let key_id = api_key.key_id();
        let user_id = api_key.owner_id().ok_or(CoreError::InvalidReference {
            entity: "api key",
            id: key_id,
            missing: "owner",
        })?;

        Ok(Self {
            token: token.into(),
            kind: SessionKind::FromApiKey { key_id, user_id },
            expires,
        })
    }

    /// Anonymous session with no user or key attribution.
    pub fn public(token: impl Into<String>, expires: Timestamp) -> Self {
        Self {
            token: token.into(),
            kind: SessionKind::Public,
            expires,
        }
    }

    /// Session established directly by `user_id`.
    pub fn for_user(token: impl Into<String>, user_id: DbId, expires: Timestamp) -> Self {
        Self {
            token: token.into(),
            kind: SessionKind::UserBound { user_id },
            expires,
        }
    }

    pub(crate) fn with_kind(token: String, kind: SessionKind, expires: Timestamp) -> Self {
        Self {
            token,
            kind,
            expires,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn key_id(&self) -> Option<DbId> {
        self.kind.key_id()
    }

    pub fn user_id(&self) -> Option<DbId> {
        self.kind.user_id()
    }

    pub fn expires(&self) -> Timestamp {
        self.expires
    }

    /// Reject sessions whose expiry is not strictly after `now`.
    pub fn ensure_expires_after(&self, now: Timestamp) -> Result<(), CoreError> {
        if self.expires <= now {
            return Err(CoreError::Validation(format!(
                "session expiry {} must be after {}",
                self.expires, now
            )));
        }
        Ok(())
    }

    /// Whether the session lapses at or before `now + window`.
    pub fn expires_within(&self, now: Timestamp, window: Duration) -> bool {
        self.expires <= now + window
    }
}

// ---------------------------------------------------------------------------
// Stored session
// ---------------------------------------------------------------------------

/// A session as held by the store, with its database identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiSession {
    #[serde(flatten)]
    meta: RowMeta,
    #[serde(flatten)]
    session: NewApiSession,
}

impl ApiSession {
    pub fn new(meta: RowMeta, session: NewApiSession) -> Self {
        Self { meta, session }
    }

    /// Assemble a stored session from flat column values.
    pub fn from_parts(
        meta: RowMeta,
        token: String,
        key_id: Option<DbId>,
        user_id: Option<DbId>,
        expires: Timestamp,
    ) -> Result<Self, CoreError> {
        let kind = SessionKind::from_columns(key_id, user_id)?;
        Ok(Self::new(meta, NewApiSession::with_kind(token, kind, expires)))
    }

    pub fn id(&self) -> DbId {
        self.meta.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.meta.created_at
    }

    pub fn meta(&self) -> &RowMeta {
        &self.meta
    }

    /// The session's attributes without its identity.
    pub fn session(&self) -> &NewApiSession {
        &self.session
    }

    pub fn token(&self) -> &str {
        self.session.token()
    }

    pub fn kind(&self) -> SessionKind {
        self.session.kind()
    }

    pub fn key_id(&self) -> Option<DbId> {
        self.session.key_id()
    }

    pub fn user_id(&self) -> Option<DbId> {
        self.session.user_id()
    }

    pub fn expires(&self) -> Timestamp {
        self.session.expires()
    }

    /// Expired, or close enough to expiry that it would lapse mid-request.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.session
            .expires_within(now, Duration::seconds(EXPIRY_LEEWAY_SECS))
    }
}

/// Generate an opaque random session token.
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    struct TestKey {
        id: DbId,
        owner: Option<DbId>,
    }

    impl ApiKeyIdentity for TestKey {
        fn key_id(&self) -> DbId {
            self.id
        }

        fn owner_id(&self) -> Option<DbId> {
            self.owner
        }
    }

    fn new_year() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn meta(id: DbId) -> RowMeta {
        RowMeta {
            id,
            created_at: new_year() - Duration::hours(3),
        }
    }

    // -- Construction paths -------------------------------------------------

    #[test]
    fn from_api_key_takes_key_and_owner() {
        let key = TestKey {
            id: 7,
            owner: Some(42),
        };
        let session = NewApiSession::from_api_key("tok-key", &key, new_year()).unwrap();

        assert_eq!(session.token(), "tok-key");
        assert_eq!(session.key_id(), Some(7));
        assert_eq!(session.user_id(), Some(42));
        assert_eq!(session.expires(), new_year());
        assert_eq!(
            session.kind(),
            SessionKind::FromApiKey {
                key_id: 7,
                user_id: 42
            }
        );
    }

    #[test]
    fn from_api_key_without_owner_is_invalid_reference() {
        let key = TestKey { id: 7, owner: None };
        let result = NewApiSession::from_api_key("tok-key", &key, new_year());

        assert_matches!(
            result,
            Err(CoreError::InvalidReference {
                entity: "api key",
                id: 7,
                missing: "owner"
            })
        );
    }

    #[test]
    fn public_session_has_no_attribution() {
        let session = NewApiSession::public("tok-pub", new_year());
        assert_eq!(session.key_id(), None);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.kind(), SessionKind::Public);
    }

    #[test]
    fn user_session_example() {
        let session = NewApiSession::for_user("tok-123", 42, new_year());
        assert_eq!(session.token(), "tok-123");
        assert_eq!(session.user_id(), Some(42));
        assert_eq!(session.key_id(), None);
        assert_eq!(session.expires(), new_year());
    }

    #[test]
    fn identical_inputs_give_equal_values() {
        let a = NewApiSession::for_user("tok", 1, new_year());
        let b = NewApiSession::for_user("tok", 1, new_year());
        assert_eq!(a, b);

        let stored_a = ApiSession::new(meta(1), a);
        let stored_b = ApiSession::new(meta(2), b);
        assert_ne!(stored_a, stored_b);
        assert_eq!(stored_a.session(), stored_b.session());
    }

    #[test]
    fn accessors_are_stable() {
        let session = NewApiSession::public("tok", new_year());
        assert_eq!(session.token(), session.token());
        assert_eq!(session.kind(), session.kind());
        assert_eq!(session.expires(), session.expires());
    }

    // -- Column mapping -----------------------------------------------------

    #[test]
    fn from_columns_covers_the_three_shapes() {
        assert_eq!(
            SessionKind::from_columns(Some(1), Some(2)).unwrap(),
            SessionKind::FromApiKey {
                key_id: 1,
                user_id: 2
            }
        );
        assert_eq!(
            SessionKind::from_columns(None, Some(2)).unwrap(),
            SessionKind::UserBound { user_id: 2 }
        );
        assert_eq!(SessionKind::from_columns(None, None).unwrap(), SessionKind::Public);
    }

    #[test]
    fn from_columns_rejects_key_without_user() {
        assert_matches!(
            SessionKind::from_columns(Some(1), None),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn from_parts_keeps_identity() {
        let stored =
            ApiSession::from_parts(meta(9), "tok".into(), None, Some(3), new_year()).unwrap();
        assert_eq!(stored.id(), 9);
        assert_eq!(stored.created_at(), meta(9).created_at);
        assert_eq!(stored.kind(), SessionKind::UserBound { user_id: 3 });
    }

    #[test]
    fn kind_labels() {
        assert_eq!(
            SessionKind::FromApiKey {
                key_id: 1,
                user_id: 1
            }
            .as_str(),
            "key"
        );
        assert_eq!(SessionKind::Public.as_str(), "public");
        assert_eq!(SessionKind::UserBound { user_id: 1 }.as_str(), "user");
    }

    // -- Expiry ---------------------------------------------------------------

    #[test]
    fn ensure_expires_after_requires_strictly_later() {
        let session = NewApiSession::public("tok", new_year());
        assert!(session.ensure_expires_after(new_year() - Duration::seconds(1)).is_ok());
        assert_matches!(
            session.ensure_expires_after(new_year()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn expiry_applies_leeway() {
        let stored = ApiSession::new(meta(1), NewApiSession::public("tok", new_year()));

        assert!(!stored.is_expired_at(new_year() - Duration::seconds(EXPIRY_LEEWAY_SECS + 1)));
        assert!(stored.is_expired_at(new_year() - Duration::seconds(EXPIRY_LEEWAY_SECS)));
        assert!(stored.is_expired_at(new_year() + Duration::minutes(1)));
    }

    // -- Serialization --------------------------------------------------------

    #[test]
    fn serializes_flat_with_type_tag() {
        let stored = ApiSession::new(meta(5), NewApiSession::for_user("tok", 42, new_year()));
        let json = serde_json::to_value(&stored).unwrap();

        assert_eq!(json["id"], 5);
        assert_eq!(json["token"], "tok");
        assert_eq!(json["type"], "user");
        assert_eq!(json["user_id"], 42);
        assert!(json.get("key_id").is_none());
    }

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
