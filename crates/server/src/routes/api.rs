//! Stub API endpoint

use axum::{Json, extract::rejection::JsonRejection};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;

#[derive(Serialize)]
pub struct EchoResponse {
    success: bool,
    message: &'static str,
    data: JsonValue,
}

/// POST /api - Acknowledge the request and echo its JSON body
pub async fn echo(
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<EchoResponse>, AppError> {
    let Json(data) = payload?;
    tracing::debug!(bytes = data.to_string().len(), "Echoing API payload");
    Ok(Json(EchoResponse {
        success: true,
        message: "POST request received",
        data,
    }))
}
