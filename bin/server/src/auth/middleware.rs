//! Authentication extractor for protected Axum routes.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use corrlinker_platform_access::Session;
use std::sync::Arc;

use super::{AppState, routes::HOME_PATH};
use crate::error::AppError;

/// Extractor requiring an authenticated session.
///
/// Every protected handler takes this as an argument, so no protected route
/// can run without the check. Anonymous and pending sessions are redirected
/// home.
pub struct RequireAuth(pub Session);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|never| match never {})?;

        let session = app_state
            .sessions
            .get(&jar)
            .await
            .map_err(|e| AuthRejection::Internal(e.into()))?;

        if !session.is_authenticated() {
            tracing::debug!(session_id = %session.id(), path = %parts.uri.path(), "unauthenticated request to protected route");
            return Err(AuthRejection::NotAuthenticated);
        }

        Ok(RequireAuth(session))
    }
}

/// Rejection type for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    Internal(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => Redirect::to(HOME_PATH).into_response(),
            Self::Internal(err) => err.into_response(),
        }
    }
}
