//! Raw packet dump recorder
//!
//! Captures one bounded window of compressed packets for offline
//! diagnostics. Each packet is stored as `MARKER || payload`; there is no
//! header, length field or checksum. Once the buffer reaches the size limit
//! the next append flushes it to storage and the recorder disables itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info};
use parking_lot::Mutex;

/// Delimiter preceding every recorded packet
pub const PACKET_MARKER: [u8; 4] = [0xFF, 0xAA, 0xCC, 0xDD];

/// Default capture window in bytes
pub const DEFAULT_MAX_DUMP_SIZE: usize = 500_000;

/// Dump file extension
pub const DUMP_EXTENSION: &str = "aeld";

/// Dump file name for the current local time
pub fn dump_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("aaceld_dump_{}.{}", timestamp, DUMP_EXTENSION)
}

/// Durable storage for a flushed dump
pub trait DumpSink {
    /// Persist `data`, returning where it went
    fn write_dump(&mut self, data: &[u8]) -> io::Result<PathBuf>;
}

/// Writes timestamped dump files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DumpSink for DirectorySink {
    fn write_dump(&mut self, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(dump_file_name());
        fs::write(&path, data)?;
        Ok(path)
    }
}

/// Recorder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// Buffer size that triggers the flush
    pub max_dump_size: usize,
    /// Directory receiving the dump file
    pub output_dir: PathBuf,
    /// Initial state; on in debug builds only
    pub enabled: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            max_dump_size: DEFAULT_MAX_DUMP_SIZE,
            output_dir: std::env::temp_dir(),
            enabled: cfg!(debug_assertions),
        }
    }
}

/// One-shot packet recorder
pub struct DumpRecorder<S: DumpSink = DirectorySink> {
    sink: S,
    buffer: Vec<u8>,
    max_dump_size: usize,
    enabled: bool,
}

impl DumpRecorder<DirectorySink> {
    pub fn from_config(config: DumpConfig) -> Self {
        let mut recorder = Self::new(DirectorySink::new(config.output_dir), config.max_dump_size);
        recorder.enabled = config.enabled;
        recorder
    }
}

impl<S: DumpSink> DumpRecorder<S> {
    /// Create an enabled recorder writing to `sink`
    pub fn new(sink: S, max_dump_size: usize) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
            max_dump_size,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bytes currently buffered, markers included
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record one packet.
    ///
    /// When the buffer is already at the limit this packet is not recorded;
    /// the buffer is flushed instead and the recorder disables itself.
    pub fn append_packet(&mut self, data: &[u8]) {
        if !self.enabled {
            return;
        }

        if self.buffer.len() >= self.max_dump_size {
            info!("Collecting dump audio data... {} bytes", self.buffer.len());
            self.flush();
        } else {
            self.buffer.extend_from_slice(&PACKET_MARKER);
            self.buffer.extend_from_slice(data);
        }
    }

    /// Write the buffer out now, then disable and clear.
    ///
    /// Write failures are logged only; diagnostics never fail the caller.
    pub fn flush(&mut self) {
        if !self.enabled {
            return;
        }

        info!("Dumping audio data...");
        match self.sink.write_dump(&self.buffer) {
            Ok(path) => info!(
                "{} byte dump written to {}",
                self.buffer.len(),
                path.display()
            ),
            Err(e) => error!("Failed to write dump file: {}", e),
        }

        self.enabled = false;
        self.buffer = Vec::new();
        info!("Packet dump disabled");
    }

    /// Re-arm the recorder with an empty buffer
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.enabled = true;
    }
}

/// Recorder shared between producers; appends are serialized by a mutex
pub struct SharedDumpRecorder<S: DumpSink = DirectorySink> {
    inner: Mutex<DumpRecorder<S>>,
}

impl<S: DumpSink> SharedDumpRecorder<S> {
    pub fn new(recorder: DumpRecorder<S>) -> Self {
        Self {
            inner: Mutex::new(recorder),
        }
    }

    pub fn append_packet(&self, data: &[u8]) {
        self.inner.lock().append_packet(data);
    }

    pub fn flush(&self) {
        self.inner.lock().flush();
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().is_enabled()
    }

    pub fn into_inner(self) -> DumpRecorder<S> {
        self.inner.into_inner()
    }
}
