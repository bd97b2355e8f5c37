//! Opaque session identifiers.
//!
//! A session identifier is 32 bytes drawn from the operating system's RNG,
//! encoded as unpadded base64url. It names the server-side session record and
//! is the only value the browser holds in its session cookie.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of random bytes in a session identifier.
const ID_BYTES: usize = 32;

/// Length of the encoded identifier (32 bytes, base64url, no padding).
const ENCODED_LEN: usize = 43;

/// Error returned when parsing a session identifier from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse session id: {}", self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Error returned when the system RNG cannot produce an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateIdError {
    pub reason: String,
}

impl fmt::Display for GenerateIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to generate session id: {}", self.reason)
    }
}

impl std::error::Error for GenerateIdError {}

/// Unique, unguessable identifier for a browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier from the system RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system RNG is unavailable.
    pub fn generate() -> Result<Self, GenerateIdError> {
        let mut bytes = [0u8; ID_BYTES];
        getrandom::fill(&mut bytes).map_err(|e| GenerateIdError {
            reason: e.to_string(),
        })?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ENCODED_LEN {
            return Err(ParseIdError {
                reason: format!("expected {ENCODED_LEN} characters, got {}", s.len()),
            });
        }
        let bytes = URL_SAFE_NO_PAD.decode(s).map_err(|e| ParseIdError {
            reason: e.to_string(),
        })?;
        if bytes.len() != ID_BYTES {
            return Err(ParseIdError {
                reason: format!("expected {ID_BYTES} bytes, got {}", bytes.len()),
            });
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SessionId::generate().expect("generate");
        let b = SessionId::generate().expect("generate");
        assert_ne!(a, b);
    }

    #[test]
    fn generated_id_parses_back() {
        let id = SessionId::generate().expect("generate");
        let parsed: SessionId = id.as_str().parse().expect("parse");
        assert_eq!(id, parsed);
        assert_eq!(id.as_str().len(), ENCODED_LEN);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "abc".parse::<SessionId>().unwrap_err();
        assert!(err.to_string().contains("expected 43 characters"));
    }

    #[test]
    fn parse_rejects_non_base64url() {
        let value = "!".repeat(ENCODED_LEN);
        assert!(value.parse::<SessionId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = SessionId::generate().expect("generate");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.as_str()));
    }
}
