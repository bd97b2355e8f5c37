//! HTTP routing for the application.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::{self, AppState};

/// Builds the application router.
///
/// Unmatched paths fall through to static assets under `public_dir`.
pub fn router(state: Arc<AppState>, public_dir: &str) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/login", get(auth::login))
        .route("/logout", get(auth::logout))
        .route("/callback", get(auth::callback))
        .route("/user", get(auth::user))
        .fallback_service(ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
