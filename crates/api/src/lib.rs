//! HTTP API server for committing point-of-sale transactions.
//!
//! Exposes the sale commit pipeline over HTTP with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use document_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use sale_commit::SaleCoordinator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::sales::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/sales", any(routes::sales::submit::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around `store`, wired with the
/// collections and retry settings from `config`.
pub fn create_default_state<S: DocumentStore + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    let coordinator = SaleCoordinator::new(store)
        .with_collections(config.collections.clone())
        .with_config(config.commit_config());

    Arc::new(AppState { coordinator })
}
