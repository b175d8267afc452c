//! AAC-ELD Core Library
//!
//! Decode session for AAC-ELD access units on top of an external codec
//! engine, plus capture and replay of the raw compressed stream for
//! offline diagnostics.

#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]

mod error;
pub mod asc;
pub mod format;
pub mod engine;
pub mod supplier;
pub mod session;
pub mod dump;
pub mod replay;
#[cfg(all(feature = "audiotoolbox", any(target_os = "macos", target_os = "ios")))]
pub mod audiotoolbox;

pub use error::*;
pub use asc::build_asc;
pub use format::{InputFormat, OutputFormat, PacketDescription, StreamDescription};
pub use engine::{CodecEngine, Converter, ConverterGuard, ConverterInfo, FillResult, PrimeInfo};
pub use supplier::{FramePacketSource, PacketSupplier, SuppliedPacket};
pub use session::{DecoderSession, PcmResult};
pub use dump::{DirectorySink, DumpConfig, DumpRecorder, DumpSink, SharedDumpRecorder, PACKET_MARKER};
pub use replay::{packet_ranges, parse_packets, read_packets, read_packets_with};
#[cfg(all(feature = "audiotoolbox", any(target_os = "macos", target_os = "ios")))]
pub use audiotoolbox::{AudioToolboxConverter, AudioToolboxEngine};

use once_cell::sync::OnceCell;
use std::panic;

static INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging (once per process).
///
/// On Android this installs the logcat backend; elsewhere the host
/// application is expected to install its own `log` backend.
pub fn init_logging() {
    INIT.get_or_init(|| {
        #[cfg(target_os = "android")]
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("aaceld-core"),
        );

        // Route panics through the logger
        panic::set_hook(Box::new(|panic_info| {
            let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            let location = if let Some(loc) = panic_info.location() {
                format!("{}:{}:{}", loc.file(), loc.line(), loc.column())
            } else {
                "unknown location".to_string()
            };

            log::error!("RUST PANIC: {} at {}", msg, location);
        }));

        log::info!("AAC-ELD core initialized");
    });
}
