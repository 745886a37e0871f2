//! Scrape-time CO2 collection.
//!
//! [`Co2Collector`] performs exactly one sensor exchange per call. It keeps
//! no state between calls: every collection opens its own port, reads once,
//! and drops the port before returning, whatever the outcome.

use std::path::{Path, PathBuf};

use crate::error::SensorError;
use crate::metric_names::{MetricDescriptor, CO2_PPM};
use crate::sensor::{Mhz16, SensorOpener, SerialOpener};

/// One CO2 sample, in ppm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    ppm: f64,
}

impl Reading {
    /// Widen the sensor's raw value without scaling.
    pub fn from_raw(raw: u16) -> Self {
        Self {
            ppm: f64::from(raw),
        }
    }

    pub fn ppm(&self) -> f64 {
        self.ppm
    }
}

/// Reads the sensor attached to a fixed device path.
#[derive(Debug)]
pub struct Co2Collector<O = SerialOpener> {
    device_path: PathBuf,
    opener: O,
}

impl Co2Collector<SerialOpener> {
    /// Collector over a real serial device with default line settings.
    pub fn serial(device_path: impl Into<PathBuf>) -> Self {
        Self::new(device_path, SerialOpener::default())
    }
}

impl<O: SensorOpener> Co2Collector<O> {
    pub fn new(device_path: impl Into<PathBuf>, opener: O) -> Self {
        Self {
            device_path: device_path.into(),
            opener,
        }
    }

    pub fn descriptor(&self) -> &'static MetricDescriptor {
        &CO2_PPM
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Open the device, read once, release it.
    ///
    /// The port lives inside `sensor` and is dropped on every return path,
    /// including the early `?` returns.
    pub fn read_ppm(&self) -> Result<Reading, SensorError> {
        let port = self.opener.open(&self.device_path)?;
        let mut sensor = Mhz16::new(port);
        let raw = sensor.read_co2()?;
        Ok(Reading::from_raw(raw))
    }

    /// Collect at most one reading, absorbing every failure.
    ///
    /// Failures are logged and yield `None`; the caller simply emits no
    /// sample for this scrape.
    pub fn collect(&self) -> Option<Reading> {
        match self.read_ppm() {
            Ok(reading) => {
                tracing::debug!(
                    device = %self.device_path.display(),
                    ppm = reading.ppm(),
                    "CO2 reading collected",
                );
                Some(reading)
            }
            Err(e) => {
                tracing::warn!(
                    device = %self.device_path.display(),
                    kind = e.kind(),
                    error = %e,
                    "CO2 read failed -- no sample this scrape",
                );
                None
            }
        }
    }
}
