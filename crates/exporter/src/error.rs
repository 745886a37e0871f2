use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Sensor failures never reach this type: they are absorbed by the collector
/// and only make the metric disappear from the scrape. What is left are
/// faults in producing the exposition itself.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The registry could not be written as text.
    #[error("Encoding error: {0}")]
    Encode(#[from] std::fmt::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to serve scrape");

        let body = json!({
            "error": "An internal error occurred",
            "code": "INTERNAL_ERROR",
        });

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
