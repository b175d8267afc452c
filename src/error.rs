//! Error types for the AAC-ELD core

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Status code returned by the codec engine.
///
/// Zero means success; any other value is engine specific and is carried
/// through unchanged so callers can match it against the engine's tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsStatus(pub i32);

impl OsStatus {
    /// Success status
    pub const NO_ERR: OsStatus = OsStatus(0);

    /// Returns true for the success status
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Four-character-code form, when all four bytes are printable ASCII
    pub fn four_cc(self) -> Option<[char; 4]> {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            Some(bytes.map(char::from))
        } else {
            None
        }
    }
}

impl fmt::Debug for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OsStatus({})", self.0)
    }
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.four_cc() {
            Some([a, b, c, d]) => write!(f, "{} ('{}{}{}{}')", self.0, a, b, c, d),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Failures while building an Audio Specific Config
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AscError {
    #[error("unsupported sample rate: {0} Hz (expected 44100 or 48000)")]
    UnsupportedSampleRate(u32),

    #[error("unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannelCount(u32),

    #[error("unsupported frame duration: {0} samples (expected 480 or 512)")]
    UnsupportedFrameDuration(u32),
}

/// Failures raised by a decoder session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    /// decode() was called before a successful configure()
    #[error("converter not configured")]
    ConverterNotConfigured,

    /// The engine rejected the input/output description pair
    #[error("cannot create converter: status {0}")]
    CannotCreateConverter(OsStatus),

    /// The engine rejected the out-of-band decoder configuration
    #[error("cannot set magic cookie: status {0}")]
    CannotSetMagicCookie(OsStatus),

    /// Non-OK status or zero frames produced for one access unit
    #[error("decode failed: status {0}")]
    DecodeFailed(OsStatus),

    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),
}

/// Failures while reading a dump file back
#[derive(Error, Debug)]
pub enum DumpReadError {
    #[error("dump file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read dump file: {0}")]
    ReadFailed(#[from] io::Error),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Asc(#[from] AscError),

    #[error(transparent)]
    Decoder(#[from] DecoderError),

    #[error(transparent)]
    DumpRead(#[from] DumpReadError),
}
