use std::sync::Arc;

use prometheus_client::registry::Registry;

use co2_core::collector::Co2Collector;
use co2_core::sensor::SensorOpener;

use crate::metrics;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Built once at startup and cheaply cloneable; the registry is never
/// rebuilt while the server runs.
#[derive(Clone)]
pub struct AppState {
    /// Registry holding the CO2 collector.
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new<O: SensorOpener>(collector: Co2Collector<O>) -> Self {
        Self {
            registry: Arc::new(metrics::build_registry(collector)),
        }
    }
}
