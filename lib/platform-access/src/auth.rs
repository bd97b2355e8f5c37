//! Authentication state of a browser session.

use crate::error::StateMismatchError;
use crate::session::{Session, fields};

/// Where a session stands in the login flow.
///
/// A destroyed session has no state of its own: the next request from that
/// browser resolves to a fresh `Anonymous` session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No profile and no login in progress.
    Anonymous,
    /// A login redirect was issued; waiting for the provider callback.
    PendingCallback,
    /// The session holds a verified profile.
    Authenticated,
}

impl AuthState {
    /// Classifies a session.
    #[must_use]
    pub fn of(session: &Session) -> Self {
        if session.is_authenticated() {
            Self::Authenticated
        } else if session.get(fields::LOGIN_STARTED_AT).is_some() {
            Self::PendingCallback
        } else {
            Self::Anonymous
        }
    }
}

/// Checks the callback `state` against the session's state token.
///
/// The state token is the session identifier itself.
///
/// # Errors
///
/// Returns `StateMismatchError` if the state is absent or differs.
pub fn verify_state(session: &Session, state: Option<&str>) -> Result<(), StateMismatchError> {
    match state {
        Some(state) if state == session.id().as_str() => Ok(()),
        other => Err(StateMismatchError {
            received: other.map(str::to_string),
        }),
    }
}
