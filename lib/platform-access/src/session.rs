//! Server-side browser sessions.
//!
//! A session is a bag of named JSON values keyed by an opaque [`SessionId`].
//! The browser only ever holds the identifier; everything else lives in the
//! session store. The `profile` field is the sole authority for whether the
//! session is authenticated.

use chrono::{DateTime, Duration, Utc};
use corrlinker_core::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profile::Profile;

/// Well-known session field names.
pub mod fields {
    /// Verified identity claims.
    pub const PROFILE: &str = "profile";
    /// Raw identity token string.
    pub const ID_TOKEN: &str = "id_token";
    /// Opaque bearer access token.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// RFC 3339 timestamp written when a login redirect is issued.
    pub const LOGIN_STARTED_AT: &str = "login_started_at";
}

/// A browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    #[serde(default)]
    fields: Map<String, Value>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Not yet written to the store.
    #[serde(skip)]
    fresh: bool,
}

impl Session {
    /// Creates a new, empty, unsaved session valid for `duration`.
    #[must_use]
    pub fn new(id: SessionId, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            fields: Map::new(),
            created_at: now,
            expires_at: now + duration,
            fresh: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns true if this session has never been saved.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Marks the session as persisted.
    pub fn mark_saved(&mut self) {
        self.fresh = false;
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Pushes the expiry out to `duration` from now.
    pub fn touch(&mut self, duration: Duration) {
        self.expires_at = Utc::now() + duration;
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the string stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Removes every field.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns the decoded profile, if the session holds a non-empty one.
    ///
    /// Unset, `null`, empty and non-object values all count as absent.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        match self.fields.get(fields::PROFILE) {
            Some(Value::Object(claims)) if !claims.is_empty() => {
                Some(Profile::new(claims.clone()))
            }
            _ => None,
        }
    }

    /// Returns true if the session carries a profile.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.fields.get(fields::PROFILE),
            Some(Value::Object(claims)) if !claims.is_empty()
        )
    }

    /// Records the tokens and claims of a completed login in one step.
    pub fn establish(&mut self, id_token: String, access_token: String, profile: Profile) {
        self.remove(fields::LOGIN_STARTED_AT);
        self.set(fields::ID_TOKEN, id_token);
        self.set(fields::ACCESS_TOKEN, access_token);
        self.set(fields::PROFILE, profile.into_value());
    }
}
