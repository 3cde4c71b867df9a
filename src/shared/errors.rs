use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::answer::HandlerError;
use crate::domain::services::{DispatchError, ResolveError};
use crate::infrastructure::StoreError;

/// Public message for faults while starting a turn
pub const CHAT_REQUEST_FAILED: &str = "An error occurred while processing chat request";

/// One itemized validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request body")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("{public}: {detail}")]
    Internal { public: &'static str, detail: String },
}

impl AppError {
    /// Internal fault with a fixed public message; `detail` is only logged
    pub fn internal(public: &'static str, detail: impl std::fmt::Display) -> Self {
        AppError::Internal {
            public,
            detail: detail.to_string(),
        }
    }
}

impl From<HandlerError> for AppError {
    fn from(e: HandlerError) -> Self {
        AppError::internal(CHAT_REQUEST_FAILED, e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::internal(CHAT_REQUEST_FAILED, e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid request body", "error": errors }),
            ),
            AppError::Resolve(e) => (StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })),
            AppError::Dispatch(e) => (StatusCode::BAD_REQUEST, json!({ "message": e.to_string() })),
            AppError::ChatNotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Chat not found" }),
            ),
            AppError::Internal { public, detail } => {
                tracing::error!(error = %detail, "{}", public);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": public }))
            }
        };

        (status, Json(body)).into_response()
    }
}
