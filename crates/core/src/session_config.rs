//! Session lifetime configuration.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default lifetime of key-derived and user-bound sessions, in minutes.
pub const DEFAULT_SESSION_EXPIRY_MINS: i64 = 180;
/// Default lifetime of public sessions, in minutes.
pub const DEFAULT_PUBLIC_SESSION_EXPIRY_MINS: i64 = 180;
/// Upper bound accepted for either lifetime: ten years, in minutes.
pub const MAX_SESSION_EXPIRY_MINS: i64 = 10 * 365 * 24 * 60;

/// How long newly issued sessions stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub session_expiry_mins: i64,
    pub public_session_expiry_mins: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_expiry_mins: DEFAULT_SESSION_EXPIRY_MINS,
            public_session_expiry_mins: DEFAULT_PUBLIC_SESSION_EXPIRY_MINS,
        }
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `API_SESSION_EXPIRY_MINS`        | `180`   |
    /// | `API_PUBLIC_SESSION_EXPIRY_MINS` | `180`   |
    ///
    /// Unset variables fall back to the defaults; unparsable, non-positive, or
    /// values above [`MAX_SESSION_EXPIRY_MINS`] are a [`CoreError::Validation`].
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            session_expiry_mins: read_minutes(
                "API_SESSION_EXPIRY_MINS",
                DEFAULT_SESSION_EXPIRY_MINS,
            )?,
            public_session_expiry_mins: read_minutes(
                "API_PUBLIC_SESSION_EXPIRY_MINS",
                DEFAULT_PUBLIC_SESSION_EXPIRY_MINS,
            )?,
        })
    }

    /// Expiry of a key-derived or user-bound session issued at `now`.
    pub fn session_expiry_from(&self, now: Timestamp) -> Result<Timestamp, CoreError> {
        expiry_after(now, self.session_expiry_mins)
    }

    /// Expiry of a public session issued at `now`.
    pub fn public_session_expiry_from(&self, now: Timestamp) -> Result<Timestamp, CoreError> {
        expiry_after(now, self.public_session_expiry_mins)
    }
}

/// `now + mins`, or a validation error if the sum does not fit a timestamp.
///
/// The fields are public, so values that bypassed [`parse_minutes`] end up
/// here too.
fn expiry_after(now: Timestamp, mins: i64) -> Result<Timestamp, CoreError> {
    Duration::try_minutes(mins)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            CoreError::Validation(format!("session lifetime of {mins} minutes is out of range"))
        })
}

fn read_minutes(var: &str, default: i64) -> Result<i64, CoreError> {
    match std::env::var(var) {
        Ok(raw) => parse_minutes(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_minutes(var: &str, raw: &str) -> Result<i64, CoreError> {
    let mins: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{var} must be a whole number of minutes")))?;
    if mins <= 0 {
        return Err(CoreError::Validation(format!("{var} must be positive")));
    }
    if mins > MAX_SESSION_EXPIRY_MINS {
        return Err(CoreError::Validation(format!(
            "{var} must be at most {MAX_SESSION_EXPIRY_MINS} minutes"
        )));
    }
    Ok(mins)
}
