//! Application error handling

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mimic_core::CoreError;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

/// HTTP error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    UnsupportedMediaType(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(err) => {
                AppError::UnsupportedMediaType(err.body_text())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

/// Anything that aborts a seeding run
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create database pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = AppError::BadRequest("broken".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::UnsupportedMediaType("no json".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_seed_error_messages() {
        let err: SeedError = ConfigError::Missing("DATABASE_URL").into();
        assert_eq!(err.to_string(), "Configuration error: DATABASE_URL must be set");

        let err: SeedError = CoreError::InvalidConfig("batch_size must be positive".into()).into();
        assert!(err.to_string().contains("batch_size"));
    }
}
