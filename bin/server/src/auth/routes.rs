//! Authentication routes: home, login, callback, logout and the user page.
//!
//! Each handler resolves the browser's session first and moves it through
//! `Anonymous -> PendingCallback -> Authenticated`; logout destroys it.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use corrlinker_platform_access::{AuthState, fields, verify_state};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, middleware::RequireAuth};
use crate::error::AppError;
use crate::pages;

/// Landing page for anonymous visitors.
pub const HOME_PATH: &str = "/";
/// Starts the login flow.
pub const LOGIN_PATH: &str = "/login";
/// The protected resource.
pub const USER_PATH: &str = "/user";

/// Query parameters for the OIDC callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Builds a 301 redirect.
///
/// The redirect targets are per-session, so the response must not be cached
/// despite the permanent status.
fn moved_permanently(location: String) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response()
}

/// Reconstructs `scheme://host` for the current request.
///
/// The host comes from `X-Forwarded-Host`, then `Host`, then the request
/// target's authority (HTTP/2 `:authority`).
fn request_origin(headers: &HeaderMap, uri: &Uri) -> Result<String, AppError> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let host = header_str("x-forwarded-host")
        .or_else(|| header_str(header::HOST.as_str()))
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .ok_or_else(|| AppError::BadRequest {
            details: "missing Host header".to_string(),
        })?;

    let scheme = match header_str("x-forwarded-proto")
        .as_deref()
        .or_else(|| uri.scheme_str())
    {
        Some("https") => "https",
        _ => "http",
    };

    Ok(format!("{scheme}://{host}"))
}

/// Renders the landing page, or sends authenticated users on to their profile.
pub async fn home(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = state.sessions.get(&jar).await?;
    tracing::debug!(session_id = %session.id(), auth_state = ?AuthState::of(&session), "home");

    if session.is_authenticated() {
        return Ok(Redirect::to(USER_PATH).into_response());
    }

    let jar = state.sessions.save(jar, &mut session).await?;
    Ok((jar, Html(pages::home::render())).into_response())
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
///
/// The session identifier doubles as the `state` token, so the session is
/// saved first to make the identifier stable.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = state.sessions.get(&jar).await?;
    tracing::debug!(session_id = %session.id(), auth_state = ?AuthState::of(&session), "login");

    if session.is_authenticated() {
        return Ok(Redirect::to(USER_PATH).into_response());
    }

    session.set(fields::LOGIN_STARTED_AT, Utc::now().to_rfc3339());
    let jar = state.sessions.save(jar, &mut session).await?;

    let auth_url = state
        .provider
        .authorization_url(session.id().as_str())
        .await;

    tracing::info!(session_id = %session.id(), "redirecting to identity provider");
    Ok((jar, moved_permanently(auth_url)).into_response())
}

/// Handles the provider redirect after the user authenticates.
///
/// The session is only written once the code exchange and the identity token
/// verification have both succeeded.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = state.sessions.get(&jar).await?;
    tracing::debug!(
        session_id = %session.id(),
        auth_state = ?AuthState::of(&session),
        state = ?query.state,
        "callback"
    );

    if session.is_authenticated() {
        return Ok(Redirect::to(USER_PATH).into_response());
    }

    if let Err(mismatch) = verify_state(&session, query.state.as_deref()) {
        tracing::warn!(session_id = %session.id(), error = %mismatch, "invalid session state");
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    if let Some(error) = query.error {
        return Err(AppError::TokenExchange {
            details: format!(
                "provider returned {error}: {}",
                query.error_description.unwrap_or_default()
            ),
        });
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::TokenExchange {
            details: "callback is missing the authorization code".to_string(),
        })?;

    let tokens = state.provider.exchange_code(&code).await?;
    let profile = state
        .provider
        .verify_id_token(&tokens.id_token, session.id().as_str())
        .await?;

    session.establish(tokens.id_token, tokens.access_token, profile);
    let jar = state.sessions.save(jar, &mut session).await?;

    tracing::info!(session_id = %session.id(), "session authenticated");
    Ok((jar, Redirect::to(USER_PATH)).into_response())
}

/// Renders the authenticated user's profile.
pub async fn user(RequireAuth(session): RequireAuth) -> Html<String> {
    let profile = session.profile().unwrap_or_default();
    Html(pages::user::render(profile))
}

/// Logs out by destroying the session, then ends the provider session too.
///
/// The session is destroyed before anything else can fail, so a malformed
/// request still ends the local session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = state.sessions.get(&jar).await?;
    tracing::info!(session_id = %session.id(), "logout");
    let jar = state.sessions.destroy(jar, &mut session).await?;

    let redirect = request_origin(&headers, &uri)
        .and_then(|return_to| Ok(state.provider.logout_url(&return_to)?));
    match redirect {
        Ok(logout_url) => Ok((jar, moved_permanently(logout_url)).into_response()),
        Err(err) => Ok((jar, err).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                value.parse().unwrap(),
            );
        }
        map
    }

    #[test]
    fn origin_uses_host_header_over_plain_http() {
        let headers = headers(&[("host", "localhost:3000")]);
        let origin = request_origin(&headers, &Uri::from_static("/logout")).unwrap();
        assert_eq!(origin, "http://localhost:3000");
    }

    #[test]
    fn origin_honours_forwarded_headers() {
        let headers = headers(&[
            ("host", "10.0.0.5:3000"),
            ("x-forwarded-host", "app.example.com"),
            ("x-forwarded-proto", "https"),
        ]);
        let origin = request_origin(&headers, &Uri::from_static("/logout")).unwrap();
        assert_eq!(origin, "https://app.example.com");
    }

    #[test]
    fn origin_without_host_is_bad_request() {
        let err = request_origin(&HeaderMap::new(), &Uri::from_static("/logout")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn origin_falls_back_to_request_authority() {
        let uri = Uri::from_static("https://app.example.com/logout");
        let origin = request_origin(&HeaderMap::new(), &uri).unwrap();
        assert_eq!(origin, "https://app.example.com");
    }

    #[test]
    fn permanent_redirect_is_not_cacheable() {
        let response = moved_permanently("https://example.com/".to_string());
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com/");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }
}
