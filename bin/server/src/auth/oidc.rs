//! OIDC client implementation using the openidconnect crate.

use async_trait::async_trait;
use base64::Engine;
use corrlinker_core::Result;
use corrlinker_platform_access::{
    ConfigurationError, IdentityProvider, OidcConfig, Profile, ProviderError, ProviderTokens,
};
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreIdToken, CoreProviderMetadata,
};
use openidconnect::url::Url;
use openidconnect::{
    AuthorizationCode, ClaimsVerificationError, ClientId, ClientSecret, CsrfToken,
    EndpointMaybeSet, EndpointNotSet, EndpointSet, IssuerUrl, Nonce, OAuth2TokenResponse,
    RedirectUrl, RequestTokenError, Scope, SignatureVerificationError, TokenResponse,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Client shape produced from discovered provider metadata.
type DiscoveredClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// OIDC client for authenticating users.
///
/// Built once at startup. Provider metadata, including the signing keys, can
/// be refreshed in place with [`refresh_metadata`](Self::refresh_metadata).
pub struct OidcClient {
    metadata: RwLock<Arc<CoreProviderMetadata>>,
    refresh_lock: Mutex<()>,
    issuer_url: IssuerUrl,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http_client: reqwest::Client,
    config: OidcConfig,
}

/// Builds the HTTP client used for every provider call.
///
/// Redirects are disabled to prevent SSRF through the token endpoint.
pub fn build_http_client(config: &OidcConfig) -> Result<reqwest::Client, ConfigurationError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.http_timeout())
        .build()
        .map_err(|e| {
            ConfigurationError::HttpClient {
                reason: e.to_string(),
            }
            .into()
        })
}

async fn fetch_metadata(
    issuer_url: &IssuerUrl,
    http_client: &reqwest::Client,
) -> Result<CoreProviderMetadata, ConfigurationError> {
    CoreProviderMetadata::discover_async(issuer_url.clone(), http_client)
        .await
        .map_err(|e| {
            ConfigurationError::Discovery {
                issuer: issuer_url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata.
    ///
    /// Settings are validated before any network call is made.
    pub async fn discover(config: OidcConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        let issuer_url = Self::issuer(&config)?;

        let metadata = fetch_metadata(&issuer_url, &http_client).await?;
        tracing::info!(issuer = %issuer_url.as_str(), "discovered OIDC provider");

        Self::from_metadata(config, metadata, http_client)
    }

    /// Creates a client from already-known provider metadata.
    pub fn from_metadata(
        config: OidcConfig,
        metadata: CoreProviderMetadata,
        http_client: reqwest::Client,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let issuer_url = Self::issuer(&config)?;
        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string()).map_err(|e| {
            ConfigurationError::InvalidSetting {
                setting: "redirect_uri",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            metadata: RwLock::new(Arc::new(metadata)),
            refresh_lock: Mutex::new(()),
            issuer_url,
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            redirect_url,
            http_client,
            config,
        })
    }

    fn issuer(config: &OidcConfig) -> Result<IssuerUrl, ConfigurationError> {
        IssuerUrl::new(config.issuer_url()).map_err(|e| {
            ConfigurationError::InvalidSetting {
                setting: "issuer_url",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Re-fetches provider metadata and signing keys.
    ///
    /// Concurrent calls coalesce: a refresh that finds another one in flight
    /// returns immediately.
    pub async fn refresh_metadata(&self) -> Result<(), ConfigurationError> {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            tracing::debug!("provider metadata refresh already in progress");
            return Ok(());
        };

        let metadata = fetch_metadata(&self.issuer_url, &self.http_client).await?;
        *self.metadata.write().await = Arc::new(metadata);
        tracing::debug!(issuer = %self.issuer_url.as_str(), "refreshed provider metadata");
        Ok(())
    }

    async fn client(&self) -> DiscoveredClient {
        let metadata = self.metadata.read().await.clone();
        CoreClient::from_provider_metadata(
            (*metadata).clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone())
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    async fn authorization_url(&self, state: &str) -> String {
        let client = self.client().await;
        let csrf_token = CsrfToken::new(state.to_string());
        let nonce = Nonce::new(state.to_string());

        let mut auth_request = client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            move || csrf_token,
            move || nonce,
        );

        // openid is always requested by the authorization request itself
        for scope in self.config.scopes() {
            if scope != "openid" {
                auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
            }
        }

        let (auth_url, _, _) = auth_request.url();
        auth_url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        let client = self.client().await;

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| ProviderError::TokenExchange {
                reason: format!("token endpoint error: {e}"),
            })?;

        let token_response = token_request
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                let reason = match e {
                    RequestTokenError::ServerResponse(response) => {
                        format!("provider rejected code: {response}")
                    }
                    other => other.to_string(),
                };
                ProviderError::TokenExchange { reason }
            })?;

        let id_token = token_response.id_token().ok_or_else(|| {
            ProviderError::InvalidProviderResponse {
                reason: "no id_token field in token response".to_string(),
            }
        })?;

        Ok(ProviderTokens {
            access_token: token_response.access_token().secret().clone(),
            id_token: id_token.to_string(),
        })
    }

    async fn verify_id_token(
        &self,
        raw_token: &str,
        nonce: &str,
    ) -> Result<Profile, ProviderError> {
        let id_token = raw_token.parse::<CoreIdToken>().map_err(|e| {
            ProviderError::TokenVerification {
                reason: format!("malformed ID token: {e}"),
            }
        })?;

        let client = self.client().await;
        let nonce = Nonce::new(nonce.to_string());
        let verified = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map(|_| ())
            .map_err(|e| {
                let unknown_key = matches!(
                    e,
                    ClaimsVerificationError::SignatureVerification(
                        SignatureVerificationError::NoMatchingKey
                    )
                );
                (unknown_key, e.to_string())
            });

        if let Err((unknown_key, reason)) = verified {
            // The provider may have rotated its keys; pick them up for the next login.
            if unknown_key {
                tracing::warn!("no provider signing key matches the ID token, refreshing metadata");
                if let Err(e) = self.refresh_metadata().await {
                    tracing::warn!(error = %e, "failed to refresh provider metadata");
                }
            }
            return Err(ProviderError::TokenVerification { reason }.into());
        }

        // The verified claims only cover the standard set; the profile keeps
        // every claim, so decode the (now trusted) payload directly.
        let claims = decode_payload(raw_token)?;
        Ok(Profile::new(claims))
    }

    fn logout_url(&self, return_to: &str) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.config.issuer_url()).map_err(|e| ProviderError::Logout {
            reason: e.to_string(),
        })?;

        let path = format!(
            "{}{}",
            url.path().trim_end_matches('/'),
            self.config.logout_path()
        );
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("returnTo", return_to)
            .append_pair("client_id", self.config.client_id());

        Ok(url.to_string())
    }
}

/// Decodes the claim set of a compact JWT.
///
/// JWT is base64url(header).base64url(payload).signature
fn decode_payload(
    raw_token: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, ProviderError> {
    let payload = raw_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ProviderError::TokenVerification {
            reason: "invalid JWT format".to_string(),
        })?;

    let payload_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ProviderError::TokenVerification {
            reason: format!("failed to decode JWT payload: {e}"),
        })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        ProviderError::TokenVerification {
            reason: format!("failed to parse JWT payload: {e}"),
        }
        .into()
    })
}
