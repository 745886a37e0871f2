//! Exposed metric descriptor.
//!
//! The exporter publishes a single unlabelled gauge. Name and help text are
//! fixed here so the collector and the registry binding agree on them.

/// Name, help text and label-free shape of an exported metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
}

/// CO2 concentration in parts-per-million.
pub const CO2_PPM: MetricDescriptor = MetricDescriptor {
    name: "co2_ppm",
    help: "co2 concentration ppm",
};
