//! Sensor-side building blocks of the CO2 exporter.
//!
//! Contains the MH-Z16 frame codec, the serial transport, and the
//! scrape-time [`collector::Co2Collector`]. Nothing here knows about HTTP or
//! the metrics registry; the `co2-exporter` crate binds these pieces to both.

pub mod collector;
pub mod error;
pub mod fake;
pub mod metric_names;
pub mod protocol;
pub mod sensor;
