use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::slug::SlugError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    MissingParameter(String),
    #[error("{message}")]
    Unauthorized {
        error: &'static str,
        message: &'static str,
    },
    #[error("workspace does not exist or you do not have access")]
    NotFound,
    #[error("resource already exists: {0}")]
    Duplicate(String),
    #[error("slug space exhausted for `{base}` after {attempts} probes")]
    SlugExhausted { base: String, attempts: u32 },
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Duplicate(_) => StatusCode::CONFLICT,
            ServiceError::SlugExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "Validation error",
            ServiceError::MissingParameter(_) => "Missing parameter",
            ServiceError::Unauthorized { error, .. } => *error,
            ServiceError::NotFound => "Workspace not found",
            ServiceError::Duplicate(_) => "Duplicate entry",
            ServiceError::SlugExhausted { .. } => "Slug unavailable",
            ServiceError::Database(_) | ServiceError::Internal(_) => "Server error",
        }
    }

    /// True when the request may succeed if sent again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::SlugExhausted { .. })
    }
}

/// Returns true when `err` is a write rejected by a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            ServiceError::Duplicate("slug is already assigned to another workspace".to_string())
        } else {
            ServiceError::Database(err)
        }
    }
}

/// Unreadable request bodies answer with the same JSON error shape as any
/// other validation failure.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl From<SlugError> for ServiceError {
    fn from(err: SlugError) -> Self {
        match err {
            SlugError::Exhausted { base, attempts } => {
                ServiceError::SlugExhausted { base, attempts }
            }
            SlugError::Store(err) => ServiceError::Internal(err),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
            ServiceError::Duplicate(_) => "Resource already exists".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));

        if self.is_retryable() {
            (status, [(RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
