//! Binding between the CO2 collector and the `prometheus-client` registry.
//!
//! The registry calls [`ScrapeCollector::encode`] on every scrape, which in
//! turn performs one sensor read. A failed read writes nothing, so the
//! `co2_ppm` family is absent from that scrape instead of stale.

use std::fmt;

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeMetric};
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;

use co2_core::collector::Co2Collector;
use co2_core::sensor::{SensorOpener, SerialOpener};

use crate::error::AppResult;

/// `Content-Type` of the text exposition produced by [`render`].
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Registry-facing wrapper around [`Co2Collector`].
#[derive(Debug)]
pub struct ScrapeCollector<O = SerialOpener> {
    inner: Co2Collector<O>,
}

impl<O: SensorOpener> ScrapeCollector<O> {
    pub fn new(inner: Co2Collector<O>) -> Self {
        Self { inner }
    }
}

impl<O: SensorOpener> Collector for ScrapeCollector<O> {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), fmt::Error> {
        let Some(reading) = self.inner.collect() else {
            return Ok(());
        };

        let descriptor = self.inner.descriptor();
        let gauge = ConstGauge::new(reading.ppm());
        let metric_encoder = encoder.encode_descriptor(
            descriptor.name,
            descriptor.help,
            None,
            gauge.metric_type(),
        )?;
        gauge.encode(metric_encoder)?;
        Ok(())
    }
}

/// Build the process-wide registry holding the CO2 collector.
pub fn build_registry<O: SensorOpener>(collector: Co2Collector<O>) -> Registry {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(ScrapeCollector::new(collector)));
    registry
}

/// Render every registered metric as OpenMetrics text.
///
/// Blocks for the duration of the sensor exchange.
pub fn render(registry: &Registry) -> AppResult<String> {
    let mut buffer = String::new();
    prometheus_client::encoding::text::encode(&mut buffer, registry)?;
    Ok(buffer)
}
