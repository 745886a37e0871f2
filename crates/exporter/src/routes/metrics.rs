use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::metrics::{self, OPENMETRICS_CONTENT_TYPE};
use crate::state::AppState;

/// GET /metrics -- one sensor read, rendered as OpenMetrics text.
///
/// The read is blocking serial I/O, so rendering runs on the blocking pool.
/// A sensor failure is not an error here: the response is still 200, just
/// without the `co2_ppm` family.
async fn scrape(State(state): State<AppState>) -> AppResult<Response> {
    let registry = Arc::clone(&state.registry);

    let body = tokio::task::spawn_blocking(move || metrics::render(&registry))
        .await
        .map_err(|e| AppError::InternalError(format!("scrape task failed: {e}")))??;

    Ok(([(CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(scrape))
}
