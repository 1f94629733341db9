use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::listing::filters::FilterError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Upstream store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Filter(e @ FilterError::Conflict { .. }) => {
                (StatusCode::CONFLICT, "FILTER_CONFLICT", e.to_string())
            }
            AppError::Filter(e) => (StatusCode::BAD_REQUEST, "INVALID_FILTER", e.to_string()),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_ERROR",
                    "The job store could not be reached".to_string(),
                )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filters::PillKind;

    #[test]
    fn test_status_codes() {
        let conflict = AppError::from(FilterError::Conflict {
            term: "python".to_string(),
            existing: PillKind::Include,
        });
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let empty = AppError::from(FilterError::EmptyTerm);
        assert_eq!(empty.into_response().status(), StatusCode::BAD_REQUEST);

        let store = AppError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(store.into_response().status(), StatusCode::BAD_GATEWAY);

        let missing = AppError::NotFound("session".to_string());
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }
}
