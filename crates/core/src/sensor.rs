//! Serial transport to the sensor.
//!
//! [`SensorOpener`] is the seam between collection and hardware: production
//! code opens a real UART through [`SerialOpener`], tests substitute the
//! in-memory port from [`crate::fake`].

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::error::{ReadError, SensorError};
use crate::protocol::{self, FRAME_LEN};

/// Fixed line speed of the MH-Z16 UART.
pub const BAUD_RATE: u32 = 9600;

/// Read timeout applied when none is configured.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Acquires a port for one collection.
///
/// The returned port is owned by the caller and closed when dropped.
pub trait SensorOpener: std::fmt::Debug + Send + Sync + 'static {
    type Port: Read + Write;

    fn open(&self, path: &Path) -> Result<Self::Port, SensorError>;
}

/// Opens the device as a 9600 8N1 serial line.
#[derive(Debug, Clone)]
pub struct SerialOpener {
    read_timeout: Duration,
}

impl Default for SerialOpener {
    fn default() -> Self {
        Self::new(DEFAULT_READ_TIMEOUT)
    }
}

impl SerialOpener {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

impl SensorOpener for SerialOpener {
    type Port = Box<dyn serialport::SerialPort>;

    fn open(&self, path: &Path) -> Result<Self::Port, SensorError> {
        serialport::new(path.to_string_lossy(), BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .map_err(|source| SensorError::Open {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// One MH-Z16 behind an open port.
///
/// Owns the port for its whole lifetime; dropping the sensor closes it.
pub struct Mhz16<P> {
    port: P,
}

impl<P: Read + Write> Mhz16<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Issue one "read gas concentration" command and decode the reply.
    pub fn read_co2(&mut self) -> Result<u16, ReadError> {
        self.port
            .write_all(&protocol::read_co2_command())
            .map_err(classify_io)?;
        self.port.flush().map_err(classify_io)?;

        let mut frame = [0u8; FRAME_LEN];
        self.port.read_exact(&mut frame).map_err(classify_io)?;

        protocol::decode_co2_response(&frame)
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}

fn classify_io(err: io::Error) -> ReadError {
    match err.kind() {
        io::ErrorKind::TimedOut => ReadError::Timeout,
        io::ErrorKind::UnexpectedEof => ReadError::ShortFrame {
            expected: FRAME_LEN,
        },
        _ => ReadError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::fake::{Behaviour, HandleStats, ScriptedPort};

    fn port(behaviour: Behaviour) -> ScriptedPort {
        ScriptedPort::new(behaviour, Arc::new(HandleStats::default()))
    }

    #[test]
    fn sends_read_command_before_reading() {
        let mut sensor = Mhz16::new(port(Behaviour::Respond(415)));
        assert_eq!(sensor.read_co2().unwrap(), 415);

        let port = sensor.into_inner();
        assert_eq!(port.written(), protocol::read_co2_command());
    }

    #[test]
    fn timeout_is_reported_as_timeout() {
        let mut sensor = Mhz16::new(port(Behaviour::Fail(io::ErrorKind::TimedOut)));
        assert_matches!(sensor.read_co2(), Err(ReadError::Timeout));
    }

    #[test]
    fn truncated_reply_is_a_short_frame() {
        let frame = protocol::encode_co2_response(415);
        let mut sensor = Mhz16::new(port(Behaviour::Raw(frame[..5].to_vec())));
        assert_matches!(
            sensor.read_co2(),
            Err(ReadError::ShortFrame { expected: FRAME_LEN })
        );
    }

    #[test]
    fn other_io_errors_are_kept() {
        let mut sensor = Mhz16::new(port(Behaviour::Fail(io::ErrorKind::BrokenPipe)));
        assert_matches!(sensor.read_co2(), Err(ReadError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn missing_device_fails_to_open() {
        let opener = SerialOpener::default();
        let err = opener
            .open(Path::new("/dev/co2-sensor-that-does-not-exist"))
            .err()
            .expect("opening a missing device must fail");
        assert_eq!(err.kind(), "open");
        assert_matches!(err, SensorError::Open { .. });
    }
}
