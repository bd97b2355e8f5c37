use corrlinker_platform_access::{IdentityProvider, MemoryStore, SessionStore};
use corrlinker_server::{
    app,
    auth::{AppState, OidcClient, SessionManager, db::PgSessionStore},
    config::{ServerConfig, SessionBackend},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => {
            tracing::info!("Using in-memory session store");
            Arc::new(MemoryStore::new())
        }
        SessionBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is required for the postgres session backend");

            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("failed to connect to database");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .expect("failed to run migrations");

            Arc::new(PgSessionStore::new(db_pool))
        }
    };

    // Cleanup expired sessions on startup
    match store.delete_expired().await {
        Ok(count) if count > 0 => {
            tracing::info!(
                deleted_sessions = count,
                "Cleaned up expired sessions on startup"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to cleanup expired sessions on startup");
        }
    }

    // Spawn periodic session cleanup task
    let cleanup_store = store.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            match cleanup_store.delete_expired().await {
                Ok(count) if count > 0 => {
                    tracing::debug!(deleted_sessions = count, "Periodic session cleanup");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to cleanup expired sessions");
                }
            }
        }
    });

    // Initialize OIDC client once; missing settings fail here
    tracing::info!("Discovering OIDC provider...");
    let oidc_client = Arc::new(
        OidcClient::discover(config.oidc)
            .await
            .expect("failed to discover OIDC provider"),
    );

    // Spawn periodic provider metadata refresh so rotated signing keys are picked up
    let refresh_client = oidc_client.clone();
    let refresh_interval = refresh_client.config().metadata_refresh_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        // The first tick completes immediately and discovery just ran
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = refresh_client.refresh_metadata().await {
                tracing::warn!(error = %e, "Failed to refresh provider metadata");
            }
        }
    });

    let provider: Arc<dyn IdentityProvider> = oidc_client;
    let sessions = SessionManager::new(store, config.session);
    let app_state = Arc::new(AppState::new(sessions, provider));

    let app = app::router(app_state, &config.server.public_dir);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
