//! OIDC (OpenID Connect) provider configuration.
//!
//! This module provides configuration types for connecting to an external
//! OIDC identity provider. The configuration is immutable once loaded and is
//! validated before the provider client performs any network call.

use crate::error::ConfigurationError;
use corrlinker_core::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the OIDC identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// The issuer, either a bare domain ("tenant.auth0.com") or a full URL.
    issuer_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the OAuth2 callback (e.g., "https://app.example.com/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Path of the provider's logout endpoint, relative to the issuer.
    /// Default: "/v2/logout"
    #[serde(default = "default_logout_path")]
    logout_path: String,
    /// Timeout applied to every provider HTTP call.
    #[serde(default = "default_http_timeout_seconds")]
    http_timeout_seconds: u64,
    /// Interval between provider metadata (and signing key) refreshes.
    #[serde(default = "default_metadata_refresh_seconds")]
    metadata_refresh_seconds: u64,
}

fn default_scopes() -> String {
    "openid,profile,email".to_string()
}

fn default_logout_path() -> String {
    "/v2/logout".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn default_metadata_refresh_seconds() -> u64 {
    3600
}

impl OidcConfig {
    /// Creates a new OIDC configuration with defaults for optional fields.
    #[must_use]
    pub fn new(
        issuer_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            issuer_url,
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
            logout_path: default_logout_path(),
            http_timeout_seconds: default_http_timeout_seconds(),
            metadata_refresh_seconds: default_metadata_refresh_seconds(),
        }
    }

    /// Checks that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingSetting` naming the first empty
    /// required setting, or `InvalidSetting` if no scope is configured or an
    /// interval is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let required = [
            ("issuer_url", &self.issuer_url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &self.redirect_uri),
        ];
        for (setting, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingSetting { setting }.into());
            }
        }
        if self.scopes().is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                setting: "scopes",
                reason: "at least one scope is required".to_string(),
            }
            .into());
        }
        let intervals = [
            ("http_timeout_seconds", self.http_timeout_seconds),
            ("metadata_refresh_seconds", self.metadata_refresh_seconds),
        ];
        for (setting, seconds) in intervals {
            if seconds == 0 {
                return Err(ConfigurationError::InvalidSetting {
                    setting,
                    reason: "must be greater than zero".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Returns the issuer URL.
    ///
    /// A bare domain is expanded to `https://{domain}/`.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        let issuer = self.issuer_url.trim();
        if issuer.contains("://") {
            issuer.to_string()
        } else {
            format!("https://{}/", issuer.trim_end_matches('/'))
        }
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the provider logout path.
    #[must_use]
    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    /// Returns the provider HTTP timeout.
    #[must_use]
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_seconds)
    }

    /// Returns the metadata refresh interval.
    #[must_use]
    pub fn metadata_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.metadata_refresh_seconds)
    }
}
