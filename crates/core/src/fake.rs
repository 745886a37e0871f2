//! In-memory sensor used in place of a UART.
//!
//! [`ScriptedOpener`] hands out [`ScriptedPort`]s that answer the read
//! command according to a fixed [`Behaviour`]. Every handle is counted in a
//! shared [`HandleStats`] on open and on drop, so tests can assert that
//! failed collections still release their port.

use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use crate::error::SensorError;
use crate::protocol::{self, FRAME_LEN};
use crate::sensor::SensorOpener;

/// How the scripted sensor reacts.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// The device cannot be opened (missing, busy, no permission).
    Unavailable,
    /// Answer with a well-formed frame carrying this value.
    Respond(u16),
    /// Answer with these bytes verbatim.
    Raw(Vec<u8>),
    /// Fail the read with this I/O error kind.
    Fail(io::ErrorKind),
}

/// Open/close accounting shared by every port of one opener.
#[derive(Debug, Default)]
pub struct HandleStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
}

impl HandleStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Handles currently open.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of handles open at the same time.
    pub fn peak_live(&self) -> usize {
        self.peak_live.load(Ordering::SeqCst)
    }

    fn on_open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_live.fetch_max(live, Ordering::SeqCst);
    }

    fn on_close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A port that replies once a complete command has been written.
#[derive(Debug)]
pub struct ScriptedPort {
    behaviour: Behaviour,
    reply: Cursor<Vec<u8>>,
    written: Vec<u8>,
    stats: Arc<HandleStats>,
    rendezvous: Option<Arc<Barrier>>,
}

impl ScriptedPort {
    pub fn new(behaviour: Behaviour, stats: Arc<HandleStats>) -> Self {
        stats.on_open();
        let reply = match &behaviour {
            Behaviour::Respond(ppm) => protocol::encode_co2_response(*ppm).to_vec(),
            Behaviour::Raw(bytes) => bytes.clone(),
            Behaviour::Unavailable | Behaviour::Fail(_) => Vec::new(),
        };
        Self {
            behaviour,
            reply: Cursor::new(reply),
            written: Vec::new(),
            stats,
            rendezvous: None,
        }
    }

    /// Block the first read until every party of `barrier` has reached it.
    pub fn with_rendezvous(mut self, barrier: Arc<Barrier>) -> Self {
        self.rendezvous = Some(barrier);
        self
    }

    /// Bytes the host has sent so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(barrier) = self.rendezvous.take() {
            barrier.wait();
        }
        if let Behaviour::Fail(kind) = self.behaviour {
            return Err(io::Error::new(kind, "scripted sensor failure"));
        }
        if self.written.len() < FRAME_LEN {
            return Ok(0);
        }
        self.reply.read(buf)
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedPort {
    fn drop(&mut self) {
        self.stats.on_close();
    }
}

/// Opener that never touches hardware.
#[derive(Debug, Clone)]
pub struct ScriptedOpener {
    behaviour: Behaviour,
    stats: Arc<HandleStats>,
    rendezvous: Option<Arc<Barrier>>,
}

impl ScriptedOpener {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            stats: Arc::new(HandleStats::default()),
            rendezvous: None,
        }
    }

    /// Make every port wait on `barrier` inside its first read, forcing
    /// concurrent collections to overlap.
    pub fn with_rendezvous(mut self, barrier: Arc<Barrier>) -> Self {
        self.rendezvous = Some(barrier);
        self
    }

    pub fn stats(&self) -> Arc<HandleStats> {
        Arc::clone(&self.stats)
    }
}

impl SensorOpener for ScriptedOpener {
    type Port = ScriptedPort;

    fn open(&self, path: &Path) -> Result<Self::Port, SensorError> {
        if let Behaviour::Unavailable = self.behaviour {
            return Err(SensorError::Open {
                path: path.to_path_buf(),
                source: serialport::Error::new(
                    serialport::ErrorKind::NoDevice,
                    "scripted sensor is unavailable",
                ),
            });
        }

        let port = ScriptedPort::new(self.behaviour.clone(), Arc::clone(&self.stats));
        Ok(match &self.rendezvous {
            Some(barrier) => port.with_rendezvous(Arc::clone(barrier)),
            None => port,
        })
    }
}
