//! mimic-server library crate
//!
//! Exposes the HTTP router (`build_app`), the schema manager, the bulk
//! loader and the seeding orchestrator. The binaries live in `main.rs`
//! and `bin/seed.rs`.

pub mod config;
pub mod db;
pub mod error;
mod middleware;
mod routes;
pub mod seed;

use std::sync::OnceLock;

use axum::{Extension, Router, middleware as axum_mw, routing::get, routing::post};
use deadpool_postgres::Pool;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

pub use seed::{SeedSummary, Seeder};

/// Handle on the process-wide Prometheus recorder, installed on first use
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "Metrics recorder already installed");
            }
            handle
        })
        .clone()
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(pool: Pool, config: &Config) -> Router {
    let prometheus_handle = prometheus_handle();

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api", post(routes::api::echo))
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::render))
        .layer(Extension(prometheus_handle))
        .with_state(pool)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
