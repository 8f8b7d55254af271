pub mod health;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::adapter::SyncJobAdapter;
use crate::extract::ContentExtractor;
use crate::models::ProxyConfig;
use crate::scoring::ScoringApi;

/// Shared application state for the Axum server.
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub adapter: SyncJobAdapter,
    pub scoring: Option<Arc<dyn ScoringApi>>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
    /// Fires when the server shuts down so in-flight polls stop early.
    pub shutdown_rx: Option<watch::Receiver<()>>,
}

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/analyze",
            post(routes::analyze)
                .options(routes::preflight)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/pure-analyze",
            post(routes::pure_analyze)
                .options(routes::preflight)
                .fallback(routes::method_not_allowed),
        )
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}
