use std::path::PathBuf;

/// Failure of a single collection attempt.
///
/// The two variants mirror the two places a scrape can fail: acquiring the
/// device handle, or the command/response exchange once it is held.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("cannot open sensor port {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: serialport::Error,
    },

    #[error("sensor read failed: {0}")]
    Read(#[from] ReadError),
}

impl SensorError {
    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SensorError::Open { .. } => "open",
            SensorError::Read(_) => "read",
        }
    }
}

/// Transport-level failure after the port was opened.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for sensor response")]
    Timeout,

    #[error("short frame: expected {expected} bytes")]
    ShortFrame { expected: usize },

    #[error("bad start byte 0x{0:02X}")]
    BadStartByte(u8),

    #[error("unexpected command echo 0x{0:02X}")]
    BadCommand(u8),

    #[error("checksum mismatch: frame carries 0x{actual:02X}, computed 0x{expected:02X}")]
    Checksum { expected: u8, actual: u8 },
}
