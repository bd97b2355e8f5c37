//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OidcConfig`](corrlinker_platform_access::OidcConfig) for
//! OIDC authentication configuration.

use axum_extra::extract::cookie::SameSite;
use corrlinker_platform_access::OidcConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// OIDC authentication configuration.
    pub oidc: OidcConfig,

    /// PostgreSQL database connection URL, required by the postgres session backend.
    #[serde(default)]
    pub database_url: Option<String>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory of static assets served for unmatched paths.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            public_dir: default_public_dir(),
        }
    }
}

/// Where session records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local map; sessions are lost on restart.
    #[default]
    Memory,
    /// PostgreSQL `sessions` table.
    Postgres,
}

/// `SameSite` policy for the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session identifier.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Domain attribute of the session cookie. Unset means host-only.
    #[serde(default)]
    pub cookie_domain: Option<String>,

    /// Path attribute of the session cookie.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_true")]
    pub secure_cookies: bool,

    /// Whether to set the HttpOnly flag on cookies.
    #[serde(default = "default_true")]
    pub http_only: bool,

    #[serde(default)]
    pub same_site: SameSitePolicy,

    /// Inactivity window in minutes; every save pushes expiry out by this much.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between expired-session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    #[serde(default)]
    pub backend: SessionBackend,
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_session_duration_minutes() -> i64 {
    60
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_domain: None,
            cookie_path: default_cookie_path(),
            secure_cookies: default_true(),
            http_only: default_true(),
            same_site: SameSitePolicy::default(),
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            backend: SessionBackend::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
