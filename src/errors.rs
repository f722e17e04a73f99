use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("not found: {message}")]
    NotFound { message: &'static str },
    #[error("store operation failed: {message}")]
    Store {
        message: &'static str,
        source: StoreError,
    },
    #[error("render failed: {message}")]
    Render { message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound { message }
    }

    pub fn store(message: &'static str, source: StoreError) -> Self {
        Self::Store { message, source }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            Self::Validation { message } => (StatusCode::BAD_REQUEST, message, None),
            Self::NotFound { message } => (StatusCode::NOT_FOUND, message.to_string(), None),
            Self::Store { message, source } => {
                tracing::error!(error = %source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message.to_string(),
                    Some(source.to_string()),
                )
            }
            Self::Render { message } => {
                // Home page failures answer in plain text, not JSON.
                tracing::error!(error = %message, "render failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}
