//! API key generation, parsing, and hashing.
//!
//! A plaintext key has the form `<identifier>.<secret>`. The identifier is a
//! UUID used to look the key up; only the SHA-256 digest of the secret is
//! stored, so a database leak does not expose usable keys.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the random secret part (alphanumeric characters).
pub const SECRET_LENGTH: usize = 48;

/// Separator between identifier and secret in the plaintext key.
pub const KEY_SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the owner exactly once, never stored).
    pub plaintext: String,
    /// Lookup identifier, stored in clear.
    pub identifier: Uuid,
    /// SHA-256 hex digest of the secret part.
    pub hash: String,
}

/// Generate a new random API key.
pub fn generate_api_key() -> GeneratedApiKey {
    let identifier = Uuid::new_v4();
    let secret: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    GeneratedApiKey {
        plaintext: format!("{identifier}{KEY_SEPARATOR}{secret}"),
        identifier,
        hash: hash_api_key(&secret),
    }
}

// ---------------------------------------------------------------------------
// Parsing / hashing
// ---------------------------------------------------------------------------

/// A plaintext key split into its two parts.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedApiKey<'a> {
    pub identifier: Uuid,
    pub secret: &'a str,
}

/// Split a presented key into identifier and secret.
///
/// Returns [`CoreError::Validation`] if the separator is missing, the
/// identifier is not a UUID, or the secret is empty.
pub fn parse_api_key(key: &str) -> Result<ParsedApiKey<'_>, CoreError> {
    let (identifier, secret) = key
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| CoreError::Validation("API key is missing its identifier".into()))?;

    let identifier = Uuid::parse_str(identifier)
        .map_err(|_| CoreError::Validation("API key identifier is not a valid UUID".into()))?;

    if secret.is_empty() {
        return Err(CoreError::Validation("API key secret is empty".into()));
    }

    Ok(ParsedApiKey { identifier, secret })
}

/// Compute the SHA-256 hex digest of an API key secret.
pub fn hash_api_key(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn generated_key_round_trips_through_parser() {
        let key = generate_api_key();
        let parsed = parse_api_key(&key.plaintext).expect("generated key must parse");

        assert_eq!(parsed.identifier, key.identifier);
        assert_eq!(parsed.secret.len(), SECRET_LENGTH);
        assert_eq!(hash_api_key(parsed.secret), key.hash);
    }

    #[test]
    fn generated_secret_is_alphanumeric() {
        let key = generate_api_key();
        let parsed = parse_api_key(&key.plaintext).unwrap();
        assert!(parsed.secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn different_keys_have_different_hashes() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.identifier, b.identifier);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            hash_api_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_api_key("secret").len(), 64);
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert_matches!(parse_api_key("no-separator-here"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_bad_identifier() {
        assert_matches!(parse_api_key("not-a-uuid.secret"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_rejects_empty_secret() {
        let key = format!("{}.", Uuid::new_v4());
        assert_matches!(parse_api_key(&key), Err(CoreError::Validation(_)));
    }

    #[test]
    fn secret_may_contain_separator() {
        let id = Uuid::new_v4();
        let key = format!("{id}.abc.def");
        let parsed = parse_api_key(&key).unwrap();
        assert_eq!(parsed.identifier, id);
        assert_eq!(parsed.secret, "abc.def");
    }
}
