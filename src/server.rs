//! HTTP server wiring: shared state, router, and startup from settings.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{IdentityResolver, JwtAuth};
use crate::config::settings::StorageBackend;
use crate::config::Settings;
use crate::core::id::RandomId;
use crate::core::llm::LLMClient;
use crate::relay::{handler, ChatRelay};
use crate::storage::memory::InMemoryStore;
use crate::storage::redis::RedisStore;
use crate::storage::ChatStore;

pub const CHAT_ROUTE: &str = "/api/chat";
pub const HEALTH_ROUTE: &str = "/health";

/// Shared, long-lived collaborators handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub relay: ChatRelay,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Construct the production collaborators once at process start.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = Settings::api_key()?;
        let provider = LLMClient::new(api_key, settings.llm.clone())?;

        let store: Arc<dyn ChatStore> = match settings.storage.backend {
            StorageBackend::Redis => {
                let store = RedisStore::new(&settings.storage)?;
                store
                    .ping()
                    .await
                    .with_context(|| format!("Redis at {} is unreachable", settings.storage.redis_url))?;
                tracing::info!("Using Redis storage at {}", settings.storage.redis_url);
                Arc::new(store)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; chats are lost on exit");
                Arc::new(InMemoryStore::new())
            }
        };

        let secret = settings.jwt_secret()?;

        Ok(Self {
            relay: ChatRelay::new(Arc::new(provider), store, Arc::new(RandomId::default())),
            identity: Arc::new(JwtAuth::new(secret.as_bytes())),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_ROUTE, post(handler::post_chat))
        .route(HEALTH_ROUTE, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
