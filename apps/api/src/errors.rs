use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::repair::RepairError;
use crate::llm_client::LlmError;
use crate::serp_client::SerpError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Keyword already tracked: {0}")]
    DuplicateKeyword(String),

    /// Single-writer guard: a second generation run for the same target.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// JSON repair gave up on a collaborator response. Terminal per call.
    #[error("Malformed collaborator response: {0}")]
    MalformedResponse(String),

    #[error("Collaborator timed out: {0}")]
    CollaboratorTimeout(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => AppError::CollaboratorTimeout("text generation".to_string()),
            other => AppError::Collaborator(format!("text generation: {other}")),
        }
    }
}

impl From<SerpError> for AppError {
    fn from(e: SerpError) -> Self {
        match e {
            SerpError::Timeout => AppError::CollaboratorTimeout("search results".to_string()),
            other => AppError::Collaborator(format!("search results: {other}")),
        }
    }
}

impl From<RepairError> for AppError {
    fn from(e: RepairError) -> Self {
        AppError::MalformedResponse(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DuplicateKeyword(kw) => (
                StatusCode::CONFLICT,
                "DUPLICATE_KEYWORD",
                format!("Keyword '{kw}' is already tracked for this language"),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed collaborator response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    msg.clone(),
                )
            }
            AppError::CollaboratorTimeout(what) => (
                StatusCode::GATEWAY_TIMEOUT,
                "COLLABORATOR_TIMEOUT",
                format!("The {what} service did not respond in time"),
            ),
            AppError::Collaborator(msg) => {
                tracing::error!("Collaborator error: {msg}");
                (StatusCode::BAD_GATEWAY, "COLLABORATOR_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
