//! Cookie-bound session resolution.
//!
//! [`SessionManager`] ties a [`SessionStore`] to the session cookie: it resolves
//! the session for a request, and on save or destroy produces the matching
//! `Set-Cookie` header through the returned [`CookieJar`].

use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Duration as ChronoDuration;
use corrlinker_core::{Result, SessionId};
use corrlinker_platform_access::{Session, SessionStore, SessionStoreError};
use std::sync::Arc;
use time::Duration as TimeDuration;

use crate::config::SessionConfig;

/// Resolves, persists and destroys browser sessions.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    fn duration(&self) -> ChronoDuration {
        ChronoDuration::minutes(self.config.duration_minutes)
    }

    /// Resolves the session bound to the request's cookie.
    ///
    /// A missing, malformed, unknown or expired cookie yields a new empty
    /// session that is not stored until [`save`](Self::save) is called.
    pub async fn get(&self, jar: &CookieJar) -> Result<Session, SessionStoreError> {
        let existing = jar
            .get(&self.config.cookie_name)
            .and_then(|cookie| cookie.value().parse::<SessionId>().ok());

        if let Some(id) = existing {
            if let Some(session) = self.store.load(&id).await? {
                return Ok(session);
            }
            tracing::debug!(session_id = %id, "session cookie does not resolve, starting new session");
        }

        let id = SessionId::generate().map_err(|e| SessionStoreError::IdGeneration {
            details: e.to_string(),
        })?;
        Ok(Session::new(id, self.duration()))
    }

    /// Persists the session and (re)issues its cookie.
    ///
    /// Every save restarts the inactivity window.
    pub async fn save(
        &self,
        jar: CookieJar,
        session: &mut Session,
    ) -> Result<CookieJar, SessionStoreError> {
        session.touch(self.duration());
        self.store.store(session).await?;
        session.mark_saved();
        Ok(jar.add(self.session_cookie(session)))
    }

    /// Clears the session, deletes its record and expires its cookie.
    pub async fn destroy(
        &self,
        jar: CookieJar,
        session: &mut Session,
    ) -> Result<CookieJar, SessionStoreError> {
        session.clear();
        self.store.delete(session.id()).await?;
        Ok(jar.add(self.removal_cookie()))
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.config.cookie_name.clone(), value))
            .path(self.config.cookie_path.clone())
            .http_only(self.config.http_only)
            .secure(self.config.secure_cookies)
            .same_site(self.config.same_site.into());
        if let Some(domain) = &self.config.cookie_domain {
            cookie = cookie.domain(domain.clone());
        }
        cookie.build()
    }

    fn session_cookie(&self, session: &Session) -> Cookie<'static> {
        let mut cookie = self.base_cookie(session.id().to_string());
        cookie.set_max_age(TimeDuration::minutes(self.config.duration_minutes));
        cookie
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.set_max_age(TimeDuration::ZERO);
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corrlinker_platform_access::{MemoryStore, fields};
    use serde_json::json;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemoryStore::new()), SessionConfig::default())
    }

    fn jar_with(manager: &SessionManager, value: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(manager.config.cookie_name.clone(), value.to_string()))
    }

    #[tokio::test]
    async fn get_without_cookie_creates_fresh_session() {
        let manager = manager();
        let session = manager.get(&CookieJar::new()).await.unwrap();
        assert!(session.is_fresh());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn save_issues_cookie_and_get_resolves_it() {
        let manager = manager();
        let mut session = manager.get(&CookieJar::new()).await.unwrap();
        session.set(fields::PROFILE, json!({"sub": "auth0|1"}));

        let jar = manager.save(CookieJar::new(), &mut session).await.unwrap();
        let cookie = jar.get("session_id").expect("cookie issued");
        assert_eq!(cookie.value(), session.id().as_str());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(TimeDuration::minutes(60)));

        let resolved = manager.get(&jar).await.unwrap();
        assert_eq!(resolved.id(), session.id());
        assert!(resolved.is_authenticated());
        assert!(!resolved.is_fresh());
    }

    #[tokio::test]
    async fn garbage_cookie_yields_new_session() {
        let manager = manager();
        let session = manager.get(&jar_with(&manager, "not-a-session-id")).await.unwrap();
        assert!(session.is_fresh());
    }

    #[tokio::test]
    async fn unknown_cookie_yields_new_session_with_new_id() {
        let manager = manager();
        let unknown = SessionId::generate().unwrap();
        let session = manager.get(&jar_with(&manager, unknown.as_str())).await.unwrap();
        assert!(session.is_fresh());
        assert_ne!(session.id(), &unknown);
    }

    #[tokio::test]
    async fn destroy_clears_fields_record_and_cookie() {
        let manager = manager();
        let mut session = manager.get(&CookieJar::new()).await.unwrap();
        session.set(fields::PROFILE, json!({"sub": "auth0|1"}));
        let jar = manager.save(CookieJar::new(), &mut session).await.unwrap();

        let jar = manager.destroy(jar, &mut session).await.unwrap();

        assert!(!session.is_authenticated());
        assert!(manager.store.load(session.id()).await.unwrap().is_none());
        let cookie = jar.get("session_id").expect("removal cookie");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
    }

    #[tokio::test]
    async fn cookie_domain_and_same_site_follow_config() {
        let config = SessionConfig {
            cookie_domain: Some("example.com".to_string()),
            same_site: crate::config::SameSitePolicy::Strict,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(Arc::new(MemoryStore::new()), config);
        let mut session = manager.get(&CookieJar::new()).await.unwrap();

        let jar = manager.save(CookieJar::new(), &mut session).await.unwrap();
        let cookie = jar.get("session_id").expect("cookie");
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(
            cookie.same_site(),
            Some(axum_extra::extract::cookie::SameSite::Strict)
        );
    }
}
