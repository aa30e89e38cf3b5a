use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::deals::duplicate::DuplicateDeal;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("duplicate deal registration")]
    DuplicateConflict(Vec<DuplicateDeal>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "error": msg }),
            ),
            Self::DuplicateConflict(duplicates) => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "duplicate deal registration",
                    "duplicates": duplicates,
                }),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            Self::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, serde_json::json!({ "error": msg }))
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!({ "error": msg })),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "unauthenticated" }),
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "forbidden" }),
            ),
            Self::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "backing store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    serde_json::json!({ "error": "backing store unavailable" }),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::Schema(msg) => {
                tracing::error!(error = %msg, "table schema mismatch");
                Self::Internal(anyhow::anyhow!("table schema mismatch: {msg}"))
            }
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}
