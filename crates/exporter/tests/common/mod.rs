#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use co2_core::collector::Co2Collector;
use co2_core::sensor::SensorOpener;
use co2_exporter::config::ServerConfig;
use co2_exporter::router::build_app_router;
use co2_exporter::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        sensor_timeout: Duration::from_millis(100),
    }
}

/// Build the full application router around `collector`.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (request ID, timeout, tracing, panic recovery) as production.
pub fn build_test_app<O: SensorOpener>(collector: Co2Collector<O>) -> Router {
    let config = test_config();
    let state = AppState::new(collector);
    build_app_router(state, &config)
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the unlabelled `co2_ppm` sample, if present.
pub fn co2_sample(exposition: &str) -> Option<f64> {
    exposition
        .lines()
        .find_map(|line| line.strip_prefix("co2_ppm "))
        .map(|value| value.trim().parse().unwrap())
}
