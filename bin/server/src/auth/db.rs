//! PostgreSQL session backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corrlinker_core::{Result, SessionId};
use corrlinker_platform_access::{Session, SessionStore, SessionStoreError};
use sqlx::{FromRow, PgPool};

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    data: serde_json::Value,
}

impl SessionRow {
    fn try_into_session(self) -> Result<Session, SessionStoreError> {
        serde_json::from_value(self.data).map_err(|e| {
            SessionStoreError::Corrupt {
                session_id: self.id,
                details: e.to_string(),
            }
            .into()
        })
    }
}

fn unavailable(e: sqlx::Error) -> SessionStoreError {
    SessionStoreError::Unavailable {
        details: e.to_string(),
    }
}

/// Session store backed by the `sessions` table.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM sessions
            WHERE id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        match row {
            Some(r) => Ok(Some(r.try_into_session()?)),
            None => Ok(None),
        }
    }

    async fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        let data = serde_json::to_value(session).map_err(|e| SessionStoreError::Corrupt {
            session_id: session.id().to_string(),
            details: e.to_string(),
        })?;
        let created_at: DateTime<Utc> = session.created_at();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session.id().as_str())
        .bind(data)
        .bind(created_at)
        .bind(session.expires_at())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn corrupt_row_reports_session_id() {
        let row = SessionRow {
            id: "sess_bad".to_string(),
            data: serde_json::json!({"fields": "not a session"}),
        };
        let err = row.try_into_session().unwrap_err();
        assert!(matches!(
            err.current_context(),
            SessionStoreError::Corrupt { session_id, .. } if session_id == "sess_bad"
        ));
    }

    #[test]
    fn stored_representation_round_trips() {
        let session = Session::new(SessionId::generate().expect("id"), Duration::hours(1));
        let row = SessionRow {
            id: session.id().to_string(),
            data: serde_json::to_value(&session).expect("serialize"),
        };
        let loaded = row.try_into_session().expect("decode");
        assert_eq!(loaded.id(), session.id());
        assert!(!loaded.is_fresh());
    }
}
