//! Amberfeed - a single-user, read-mostly Mastodon-compatible API
//! over a pre-compiled post snapshot
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Mastodon API compatible endpoints                        │
//! │  - OAuth bridge endpoints                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Snapshot / Bridge Layer                     │
//! │  - Pure pagination over the post snapshot                   │
//! │  - Signed client-carried OAuth state                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  External Collaborators                      │
//! │  - Snapshot store (R2 or local file)                        │
//! │  - Content store (R2 or local file)                         │
//! │  - Identity provider (GitHub)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for the Mastodon API and the OAuth bridge
//! - `auth`: bridge state signing, sealing, provider client
//! - `data`: snapshot models and the pagination engine
//! - `storage`: snapshot and content store collaborators
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod storage;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request. Everything in it is
/// immutable after startup: there is no shared mutable memory between
/// concurrent invocations.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Snapshot store (read path)
    pub snapshot: Arc<storage::SnapshotStore>,

    /// Content store (write path)
    pub content: Arc<storage::ContentStore>,

    /// Identity provider client
    pub provider: Arc<auth::ProviderClient>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the shared HTTP client
    /// 2. Connect the snapshot and content stores
    /// 3. Build the identity provider client
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Amberfeed/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        let snapshot = storage::SnapshotStore::new(
            &config.storage.snapshot,
            config.cloudflare.as_ref(),
        )?;
        let content =
            storage::ContentStore::new(&config.storage.content, config.cloudflare.as_ref())?;
        tracing::info!("Stores initialized");

        let provider = auth::ProviderClient::new(http_client, config.auth.provider.clone());

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            snapshot: Arc::new(snapshot),
            content: Arc::new(content),
            provider: Arc::new(provider),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{
        compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer,
    };

    // Mastodon web clients call the API cross-origin.
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::mastodon_api_router())
        .nest("/oauth", api::oauth_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
