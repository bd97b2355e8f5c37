//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionStoreError`: session backend failures
//! - `ConfigurationError`: missing or unusable provider settings
//! - `ProviderError`: failures while talking to the identity provider
//! - `StateMismatchError`: the callback state does not belong to the session

use std::fmt;

/// Errors from session backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The backend could not be reached or rejected the operation.
    Unavailable { details: String },
    /// A stored session record could not be decoded.
    Corrupt { session_id: String, details: String },
    /// A new session identifier could not be generated.
    IdGeneration { details: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => {
                write!(f, "session store unavailable: {details}")
            }
            Self::Corrupt {
                session_id,
                details,
            } => {
                write!(f, "session '{session_id}' is corrupt: {details}")
            }
            Self::IdGeneration { details } => {
                write!(f, "session id generation failed: {details}")
            }
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Errors from building the provider client.
///
/// These are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required setting is empty or absent.
    MissingSetting { setting: &'static str },
    /// A setting is present but cannot be used.
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },
    /// The issuer's discovery document could not be fetched or parsed.
    Discovery { issuer: String, reason: String },
    /// The HTTP client used for provider calls could not be built.
    HttpClient { reason: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting { setting } => {
                write!(f, "missing required setting: {setting}")
            }
            Self::InvalidSetting { setting, reason } => {
                write!(f, "invalid setting {setting}: {reason}")
            }
            Self::Discovery { issuer, reason } => {
                write!(f, "failed to discover provider '{issuer}': {reason}")
            }
            Self::HttpClient { reason } => {
                write!(f, "failed to create HTTP client: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected the authorization code or could not be reached.
    TokenExchange { reason: String },
    /// The token response was malformed or lacked an identity token.
    InvalidProviderResponse { reason: String },
    /// The identity token failed signature, issuer, audience, nonce or expiry checks.
    TokenVerification { reason: String },
    /// The provider logout URL could not be composed.
    Logout { reason: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExchange { reason } => {
                write!(f, "token exchange failed: {reason}")
            }
            Self::InvalidProviderResponse { reason } => {
                write!(f, "invalid provider response: {reason}")
            }
            Self::TokenVerification { reason } => {
                write!(f, "failed to verify ID token: {reason}")
            }
            Self::Logout { reason } => {
                write!(f, "failed to build logout URL: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// The `state` returned on the callback is not the session's state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMismatchError {
    /// The state value the provider echoed back, if any.
    pub received: Option<String>,
}

impl fmt::Display for StateMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.received {
            Some(state) => write!(f, "state '{state}' does not match session"),
            None => write!(f, "callback is missing the state parameter"),
        }
    }
}

impl std::error::Error for StateMismatchError {}
