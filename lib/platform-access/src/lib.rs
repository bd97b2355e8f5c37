//! Session management and OIDC authentication primitives for corrlinker.
//!
//! This crate provides:
//! - Browser sessions (`Session`) and their storage backends (`SessionStore`)
//! - OIDC provider configuration (`OidcConfig`) and the provider contract
//!   (`IdentityProvider`)
//! - Verified identity claims (`Profile`)
//! - The login flow's state classification (`AuthState`)
//! - Authentication error types
//!
//! # Example
//!
//! ```
//! use corrlinker_core::SessionId;
//! use corrlinker_platform_access::{AuthState, Profile, Session};
//! use chrono::Duration;
//!
//! let mut session = Session::new(SessionId::generate().unwrap(), Duration::hours(1));
//! assert_eq!(AuthState::of(&session), AuthState::Anonymous);
//!
//! let claims = serde_json::json!({"sub": "auth0|123456", "name": "Alice"});
//! let profile: Profile = serde_json::from_value(claims).unwrap();
//! session.establish("header.payload.sig".into(), "opaque".into(), profile);
//!
//! assert_eq!(AuthState::of(&session), AuthState::Authenticated);
//! ```

pub mod auth;
pub mod error;
pub mod oidc;
pub mod profile;
pub mod provider;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use auth::{AuthState, verify_state};
pub use error::{ConfigurationError, ProviderError, SessionStoreError, StateMismatchError};
pub use oidc::OidcConfig;
pub use profile::Profile;
pub use provider::{IdentityProvider, ProviderTokens};
pub use session::{Session, fields};
pub use store::{MemoryStore, SessionStore};
