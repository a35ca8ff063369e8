//! HTTP error mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kba_core::AppError;
use serde::Serialize;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    /// Malformed query string or body
    #[error("{0}")]
    BadRequest(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// Rejected before any database or provider work started.
    fn is_precondition(&self) -> bool {
        match self {
            ApiError::BadRequest(_) => true,
            ApiError::App(err) => err.is_precondition(),
            ApiError::Join(_) => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::App(err) => match err {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Llm(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Join(_) => "INTERNAL_ERROR",
            ApiError::App(err) => match err {
                AppError::Validation(_) => "BAD_REQUEST",
                AppError::NotFound(_) => "NOT_FOUND",
                AppError::Config(_) => "CONFIG_ERROR",
                AppError::Llm(_) => "LLM_ERROR",
                AppError::Database(_) => "DATABASE_ERROR",
                _ => "INTERNAL_ERROR",
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::App(AppError::Validation(message))
            | ApiError::App(AppError::NotFound(message))
            | ApiError::App(AppError::Config(message)) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_precondition() && status.is_server_error() {
            tracing::warn!("Request refused: {}", self);
        } else if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.error_code(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

/// Result alias used by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            (AppError::Llm("x".into()), StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            (AppError::Prompt("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status_code(), status);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn test_precondition_classification() {
        let missing_key = AppError::Config("OPENAI_API_KEY is not set".into());
        assert!(ApiError::from(missing_key).is_precondition());
        assert!(ApiError::from(AppError::Validation("x".into())).is_precondition());
        assert!(ApiError::BadRequest("x".into()).is_precondition());
        assert!(!ApiError::from(AppError::Llm("x".into())).is_precondition());
        assert!(!ApiError::from(AppError::Database("x".into())).is_precondition());
    }

    #[test]
    fn test_validation_message_is_unprefixed() {
        let api = ApiError::from(AppError::Validation("context_ids is required".into()));
        assert_eq!(api.message(), "context_ids is required");
    }
}
