//! Prometheus exposition endpoint

use axum::Extension;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics - Render HTTP metrics in Prometheus text format
pub async fn render(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}
