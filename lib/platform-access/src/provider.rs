//! Identity provider contract.
//!
//! The HTTP layer only ever talks to the provider through this trait, so the
//! login flow can be exercised without a live provider.

use async_trait::async_trait;
use corrlinker_core::Result;

use crate::error::ProviderError;
use crate::profile::Profile;

/// Tokens returned by a successful authorization-code exchange.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    /// Opaque bearer token for provider APIs.
    pub access_token: String,
    /// Raw, not yet verified, identity token.
    pub id_token: String,
}

/// An OIDC identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Composes the URL the browser is sent to for authentication.
    ///
    /// `state` is echoed back unchanged on the callback and is also sent as
    /// the OIDC nonce.
    async fn authorization_url(&self, state: &str) -> String;

    /// Exchanges an authorization code at the token endpoint.
    ///
    /// Fails with `TokenExchange` when the provider rejects the code or cannot
    /// be reached, and with `InvalidProviderResponse` when the response
    /// carries no identity token.
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError>;

    /// Verifies signature, issuer, audience, expiry and nonce of an identity
    /// token and returns its claims.
    async fn verify_id_token(&self, raw_token: &str, nonce: &str)
    -> Result<Profile, ProviderError>;

    /// Composes the provider's logout URL.
    fn logout_url(&self, return_to: &str) -> Result<String, ProviderError>;
}
