//! API router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_flash, api_info, clear_values, delete_value, destroy_session, get_value, health,
    put_value, session_info, take_flashes, visits, AppState,
};
use crate::middleware::SessionLayer;
use crate::store::{CookieOptions, MemoryStore};

/// Session settings for the server.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Session cookie name.
    pub cookie_name: String,
    /// Cookie attributes.
    pub cookie: CookieOptions,
    /// Save modified sessions after each handler.
    pub auto_save: bool,
    /// Drop sessions idle for longer than this.
    pub idle_timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            cookie: CookieOptions::default(),
            auto_save: false,
            idle_timeout: Some(Duration::from_secs(60 * 60 * 24)),
        }
    }
}

/// Create the API router with default settings.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new(), &SessionSettings::default())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState, settings: &SessionSettings) -> Router {
    let sessions = SessionLayer::new(settings.cookie_name.clone(), state.store.clone())
        .with_auto_save(settings.auto_save);

    // Session routes
    let session_routes = Router::new()
        .route("/", get(session_info).delete(destroy_session))
        .route("/values", axum::routing::delete(clear_values))
        .route(
            "/values/{key}",
            get(get_value).put(put_value).delete(delete_value),
        )
        .route("/visits", get(visits))
        .route("/flashes", get(take_flashes).post(add_flash))
        .layer(sessions);

    // API v1 routes
    let api_v1 = Router::new()
        .route("/", get(api_info))
        .nest("/session", session_routes);

    // Build main router
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Session settings.
    pub session: SessionSettings,
    /// Stop accepting connections on Ctrl-C and drain in-flight requests.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session: SessionSettings::default(),
            graceful_shutdown: true,
        }
    }
}

/// Start the API server.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    let store = Arc::new(MemoryStore::with_options(config.session.cookie.clone()));
    serve_with_state(config, AppState::with_store(store)).await
}

/// Start the API server with custom state.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();

    if let Some(idle_timeout) = config.session.idle_timeout {
        spawn_purge_task(Arc::clone(&state.store), idle_timeout);
    }

    let router = create_router_with_state(state, &config.session);

    tracing::info!(
        cookie = %config.session.cookie_name,
        "Starting request-sessions demo server on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if config.graceful_shutdown {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, router).await?;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodically drop idle sessions from the store.
fn spawn_purge_task(store: Arc<MemoryStore>, idle_timeout: Duration) {
    let period = (idle_timeout / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = store.purge_idle(idle_timeout) {
                tracing::warn!(error = %e, "idle session purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
