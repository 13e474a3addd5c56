use axum::http::StatusCode;
use tracing::error;

use crate::store::StoreError;

/// Handler-facing error shape: status code plus user message.
pub type ErrorResponse = (StatusCode, String);

pub fn store_error(e: StoreError) -> ErrorResponse {
    match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
        StoreError::Duplicate(field) => (StatusCode::CONFLICT, format!("{field} already taken")),
        StoreError::Unavailable(err) => {
            error!(error = %err, "store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".into(),
            )
        }
    }
}

pub fn internal<E: std::fmt::Display>(e: E) -> ErrorResponse {
    error!(error = %e, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong".into(),
    )
}
