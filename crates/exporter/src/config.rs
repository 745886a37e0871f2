use std::time::Duration;

use co2_core::sensor::DEFAULT_READ_TIMEOUT;

/// Server configuration loaded from environment variables.
///
/// Every field has a default; the exporter runs with no environment at all.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `2112`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Serial read timeout (default: 1000 ms).
    pub sensor_timeout: Duration,
}

/// A variable was set but could not be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{var} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

pub const DEFAULT_PORT: u16 = 2112;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            request_timeout_secs: 30,
            sensor_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `2112`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `SENSOR_TIMEOUT_MS`    | `1000`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", "u16")?.unwrap_or(defaults.port);
        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?
            .unwrap_or(defaults.request_timeout_secs);
        let sensor_timeout = parse_var::<u64, _>(&lookup, "SENSOR_TIMEOUT_MS", "u64")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.sensor_timeout);

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            sensor_timeout,
        })
    }
}

fn parse_var<T, F>(
    lookup: &F,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError {
                var,
                expected,
                value,
            }),
    }
}
