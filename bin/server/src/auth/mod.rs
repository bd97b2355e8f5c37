//! Authentication module for the corrlinker server.
//!
//! This module provides:
//! - OIDC authentication with an external identity provider
//! - Cookie-bound sessions over a pluggable store (in-memory or PostgreSQL)
//! - The [`RequireAuth`] extractor guarding protected routes
//!
//! A browser session moves `Anonymous -> PendingCallback -> Authenticated`
//! through [`login`] and [`callback`]; [`logout`] destroys it. The presence
//! of a non-empty `profile` field is the only thing that makes a session
//! authenticated.

pub mod db;
pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod session;

pub use middleware::{AuthRejection, RequireAuth};
pub use oidc::OidcClient;
pub use routes::{callback, home, login, logout, user};
pub use session::SessionManager;

use corrlinker_platform_access::IdentityProvider;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Session resolution and persistence.
    pub sessions: SessionManager,
    /// Identity provider used by the login flow.
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(sessions: SessionManager, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { sessions, provider }
    }
}
