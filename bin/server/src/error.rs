//! Uniform error responder for the HTTP layer.
//!
//! Handlers convert library reports into an [`AppError`]; its `IntoResponse`
//! implementation logs the failure and renders a plain-text body with a status
//! code reflecting fault attribution.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use corrlinker_platform_access::{ProviderError, SessionStoreError};
use rootcause::Report;
use std::fmt;

/// Errors surfaced to the browser.
#[derive(Debug)]
pub enum AppError {
    /// The session backend failed.
    SessionStore { details: String },
    /// The provider rejected or could not process the authorization code.
    TokenExchange { details: String },
    /// The token response was malformed.
    InvalidProviderResponse { details: String },
    /// The identity token did not verify.
    TokenVerification { details: String },
    /// The request lacks information the handler needs.
    BadRequest { details: String },
    /// Any other server-side failure.
    Internal { details: String },
}

impl AppError {
    /// The status code reported for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TokenExchange { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::SessionStore { .. }
            | Self::InvalidProviderResponse { .. }
            | Self::TokenVerification { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStore { details }
            | Self::InvalidProviderResponse { details }
            | Self::TokenVerification { details }
            | Self::BadRequest { details }
            | Self::Internal { details } => f.write_str(details),
            Self::TokenExchange { .. } => f.write_str("authentication failed"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<Report<SessionStoreError>> for AppError {
    fn from(report: Report<SessionStoreError>) -> Self {
        Self::SessionStore {
            details: report.current_context().to_string(),
        }
    }
}

impl From<Report<ProviderError>> for AppError {
    fn from(report: Report<ProviderError>) -> Self {
        let details = report.current_context().to_string();
        match report.current_context() {
            ProviderError::TokenExchange { .. } => Self::TokenExchange { details },
            ProviderError::InvalidProviderResponse { .. } => {
                Self::InvalidProviderResponse { details }
            }
            ProviderError::TokenVerification { .. } => Self::TokenVerification { details },
            ProviderError::Logout { .. } => Self::Internal { details },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::TokenExchange { details } => {
                tracing::warn!(error = %details, "authorization code exchange failed");
            }
            Self::BadRequest { details } => {
                tracing::debug!(error = %details, "rejecting malformed request");
            }
            Self::TokenVerification { details } => {
                tracing::error!(error = %details, "identity token failed verification");
            }
            Self::SessionStore { details }
            | Self::InvalidProviderResponse { details }
            | Self::Internal { details } => {
                tracing::error!(error = %details, status = %status, "request failed");
            }
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_provider(err: ProviderError) -> AppError {
        AppError::from(Report::<ProviderError>::from(err))
    }

    #[test]
    fn token_exchange_is_unauthorized_without_leaking_details() {
        let err = from_provider(ProviderError::TokenExchange {
            reason: "invalid_grant: code expired".to_string(),
        });
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "authentication failed");
    }

    #[test]
    fn verification_failure_is_server_error_with_text() {
        let err = from_provider(ProviderError::TokenVerification {
            reason: "bad signature".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("bad signature"));
    }

    #[test]
    fn missing_id_token_is_server_error() {
        let err = from_provider(ProviderError::InvalidProviderResponse {
            reason: "no id_token field in token response".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn session_store_failure_is_server_error() {
        let report = Report::<SessionStoreError>::from(SessionStoreError::Unavailable {
            details: "connection reset".to_string(),
        });
        let err = AppError::from(report);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn response_is_plain_text() {
        let response = AppError::BadRequest {
            details: "missing Host header".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
