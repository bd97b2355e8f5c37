//! Session storage backends.
//!
//! The storage backend is a keyed record store. Concurrent writers to the same
//! session key are serialized by the backend itself; nothing above it locks.

use async_trait::async_trait;
use corrlinker_core::{Result, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SessionStoreError;
use crate::session::Session;

/// Persistence for session records.
///
/// This abstraction lets the HTTP layer run against PostgreSQL in production
/// and an in-memory map in tests and single-process deployments.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session. Expired records are reported as absent.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Inserts or replaces a session record.
    async fn store(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Deletes a session record. Deleting an absent record is not an error.
    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Deletes all expired records, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, SessionStoreError>;
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        match sessions.get(id) {
            Some(session) if session.is_expired() => {
                debug!(session_id = %id, "ignoring expired session");
                Ok(None)
            }
            Some(session) => {
                let mut session = session.clone();
                session.mark_saved();
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut stored = session.clone();
        stored.mark_saved();
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), stored);
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fields;
    use chrono::Duration;

    fn session(duration: Duration) -> Session {
        Session::new(SessionId::generate().expect("id"), duration)
    }

    #[tokio::test]
    async fn store_then_load_returns_saved_copy() {
        let store = MemoryStore::new();
        let mut session = session(Duration::hours(1));
        session.set(fields::ACCESS_TOKEN, "abc");

        store.store(&session).await.unwrap();
        let loaded = store.load(session.id()).await.unwrap().expect("present");

        assert!(!loaded.is_fresh());
        assert_eq!(loaded.get_str(fields::ACCESS_TOKEN), Some("abc"));
    }

    #[tokio::test]
    async fn load_unknown_id_is_none() {
        let store = MemoryStore::new();
        let id = SessionId::generate().expect("id");
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_absent_and_swept() {
        let store = MemoryStore::new();
        let expired = session(Duration::seconds(-1));
        let live = session(Duration::hours(1));
        store.store(&expired).await.unwrap();
        store.store(&live).await.unwrap();

        assert!(store.load(expired.id()).await.unwrap().is_none());
        assert_eq!(store.delete_expired().await.unwrap(), 1);
        assert_eq!(store.sessions.read().await.len(), 1);
        assert!(store.load(live.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let session = session(Duration::hours(1));
        store.store(&session).await.unwrap();

        store.delete(session.id()).await.unwrap();
        store.delete(session.id()).await.unwrap();
        assert!(store.sessions.read().await.is_empty());
    }
}
