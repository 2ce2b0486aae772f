//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode};
use deadpool_postgres::Pool;
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn unhealthy(reason: String) -> (StatusCode, Json<HealthResponse>) {
    tracing::error!(%reason, "Health check failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unhealthy",
            reason: Some(reason),
        }),
    )
}

/// GET /health - Report whether the store answers `SELECT 1`
pub async fn check(State(pool): State<Pool>) -> (StatusCode, Json<HealthResponse>) {
    let client = match pool.get().await {
        Ok(client) => client,
        Err(e) => return unhealthy(format!("Database connection failed: {e}")),
    };

    match client.query_one("SELECT 1", &[]).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                reason: None,
            }),
        ),
        Err(e) => unhealthy(format!("Database query failed: {e}")),
    }
}
