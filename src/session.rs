//! AAC-ELD decoder session
//!
//! A session owns at most one live converter. `configure` builds the input
//! and output descriptions, replaces any previous converter and applies the
//! magic cookie; `decode` turns one access unit into PCM.
//!
//! A session is not `Sync`-shared: decode borrows it mutably, so one
//! in-flight decode per session is enforced by the borrow checker.
//! Independent sessions share nothing.

use log::{debug, error, info, warn};

use crate::asc::build_asc;
use crate::engine::{CodecEngine, Converter, ConverterGuard, ConverterInfo};
use crate::error::DecoderError;
use crate::format::{pcm_buffer_len, InputFormat, OutputFormat};
use crate::supplier::FramePacketSource;

/// Decoded PCM for one access unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmResult {
    /// Interleaved PCM; exactly `frames * bytes_per_frame` bytes long
    pub bytes: Vec<u8>,
    /// PCM frames produced; never more than `frames_per_packet`
    pub frames: u32,
}

/// Session lifecycle
enum SessionState<C: Converter> {
    NotConfigured,
    Configured {
        converter: ConverterGuard<C>,
        input: InputFormat,
        output: OutputFormat,
    },
    Disposed,
}

/// Decoder session over a codec engine
pub struct DecoderSession<E: CodecEngine> {
    engine: E,
    state: SessionState<E::Converter>,
}

impl<E: CodecEngine> DecoderSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::NotConfigured,
        }
    }

    /// True once configured and until disposed
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Configured { .. })
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, SessionState::Disposed)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Configured formats, if any
    pub fn formats(&self) -> Option<(InputFormat, OutputFormat)> {
        match &self.state {
            SessionState::Configured { input, output, .. } => Some((*input, *output)),
            _ => None,
        }
    }

    /// Configure the decoder.
    ///
    /// Any previous converter is disposed before the new one is created.
    /// A rejected magic cookie is fatal: the new converter is disposed and
    /// the session is left unconfigured.
    pub fn configure(
        &mut self,
        magic_cookie: Option<&[u8]>,
        input: InputFormat,
        output: OutputFormat,
    ) -> Result<(), DecoderError> {
        let in_desc = input.stream_description()?;
        let out_desc = output.stream_description()?;
        pcm_buffer_len(&input, &output)?;

        self.release();
        self.state = SessionState::NotConfigured;

        let converter = self
            .engine
            .create(&in_desc, &out_desc)
            .map_err(DecoderError::CannotCreateConverter)?;
        let mut converter = ConverterGuard::new(converter);
        info!(
            "Converter created: {} Hz {} ch {} frames/packet -> {} Hz {} ch {} bit",
            input.sample_rate,
            input.channels,
            input.frames_per_packet,
            output.sample_rate,
            output.channels,
            output.bits_per_channel
        );

        if let Some(cookie) = magic_cookie.filter(|c| !c.is_empty()) {
            if let Some(conv) = converter.get_mut() {
                if let Err(status) = conv.set_magic_cookie(cookie) {
                    error!("Magic cookie rejected ({} bytes): status {}", cookie.len(), status);
                    return Err(DecoderError::CannotSetMagicCookie(status));
                }
                debug!("Magic cookie applied ({} bytes)", cookie.len());
            }
        }

        self.state = SessionState::Configured {
            converter,
            input,
            output,
        };

        if log::log_enabled!(log::Level::Debug) {
            self.log_converter_info();
        }
        Ok(())
    }

    /// Configure from stream parameters alone, generating the magic cookie
    /// with [`build_asc`]. Input and output share rate and channel count.
    pub fn configure_eld(
        &mut self,
        sample_rate: u32,
        channels: u32,
        frame_duration: u32,
        bits_per_channel: u32,
    ) -> crate::Result<()> {
        let cookie = build_asc(sample_rate, channels, frame_duration)?;
        let input = InputFormat::new(f64::from(sample_rate), channels, frame_duration);
        let output = OutputFormat::new(f64::from(sample_rate), channels, bits_per_channel);
        self.configure(Some(&cookie), input, output)?;
        Ok(())
    }

    /// Decode one access unit using the full `frames_per_packet` request
    pub fn decode(&mut self, frame: &[u8]) -> Result<PcmResult, DecoderError> {
        self.decode_frames(frame, u32::MAX)
    }

    /// Decode one access unit, requesting at most `max_frames` PCM frames
    /// (capped at `frames_per_packet`).
    ///
    /// A failure only concerns this frame; the session stays configured.
    pub fn decode_frames(&mut self, frame: &[u8], max_frames: u32) -> Result<PcmResult, DecoderError> {
        let SessionState::Configured {
            converter,
            input,
            output,
        } = &mut self.state
        else {
            return Err(DecoderError::ConverterNotConfigured);
        };
        let conv = converter
            .get_mut()
            .ok_or(DecoderError::ConverterNotConfigured)?;

        let bytes_per_frame = output.bytes_per_frame() as usize;
        let requested = max_frames.min(input.frames_per_packet);
        let mut pcm = vec![0u8; requested as usize * bytes_per_frame];

        let mut source = FramePacketSource::new(frame, input.channels);
        let result = conv.fill_buffer(&mut source, requested, &mut pcm);

        if !result.status.is_ok() || result.frames == 0 {
            warn!(
                "Decode failed for {} byte frame: status {}, {} frames",
                frame.len(),
                result.status,
                result.frames
            );
            return Err(DecoderError::DecodeFailed(result.status));
        }

        // Window the buffer down; the allocation is kept as is
        let frames = result.frames.min(requested);
        pcm.truncate(frames as usize * bytes_per_frame);

        Ok(PcmResult { bytes: pcm, frames })
    }

    /// Property snapshot of the live converter
    pub fn converter_info(&self) -> Option<ConverterInfo> {
        match &self.state {
            SessionState::Configured { converter, .. } => converter.get().map(|c| c.info()),
            _ => None,
        }
    }

    /// Log the live converter's properties
    pub fn log_converter_info(&self) {
        let Some(info) = self.converter_info() else {
            warn!("No converter to inspect");
            return;
        };

        match info.input_description {
            Some(desc) => {
                info!("=== Converter Input ASBD ===");
                info!("format id:          0x{:08x}", desc.format_id);
                info!("format flags:       0x{:x}", desc.format_flags);
                info!("channels per frame: {}", desc.channels_per_frame);
                info!("non-interleaved:    {}", desc.is_non_interleaved());
            }
            None => error!("Converter input description unavailable"),
        }

        match info.output_description {
            Some(desc) => {
                info!("=== Converter Output ASBD ===");
                info!("sample rate:        {}", desc.sample_rate);
                info!("format id:          0x{:08x}", desc.format_id);
                info!("format flags:       0x{:x}", desc.format_flags);
                info!("channels per frame: {}", desc.channels_per_frame);
                info!("bytes per frame:    {}", desc.bytes_per_frame);
                info!("bytes per packet:   {}", desc.bytes_per_packet);
                info!("non-interleaved:    {}", desc.is_non_interleaved());
            }
            None => error!("Converter output description unavailable"),
        }

        match info.prime_info {
            Some(prime) => {
                info!("=== Converter Prime Info ===");
                info!("leading frames:     {}", prime.leading_frames);
                info!("trailing frames:    {}", prime.trailing_frames);
            }
            None => error!("Converter prime info unavailable"),
        }

        match info.magic_cookie_size {
            Some(0) => info!("Decompression magic cookie not present"),
            Some(size) => info!("Decompression magic cookie size: {} bytes", size),
            None => error!("Decompression magic cookie size unavailable"),
        }

        let sizes = [
            ("Minimum input buffer size", info.min_input_buffer_size),
            ("Minimum output buffer size", info.min_output_buffer_size),
            ("Maximum input packet size", info.max_input_packet_size),
            ("Maximum output packet size", info.max_output_packet_size),
        ];
        for (label, value) in sizes {
            match value {
                Some(bytes) => info!("{}: {} bytes", label, bytes),
                None => error!("{} unavailable", label),
            }
        }
    }

    /// Release the converter. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.release();
        self.state = SessionState::Disposed;
    }

    fn release(&mut self) {
        if let SessionState::Configured { converter, .. } = &mut self.state {
            converter.dispose();
        }
        if !matches!(self.state, SessionState::Disposed) {
            self.state = SessionState::NotConfigured;
        }
    }
}

impl<E: CodecEngine> Drop for DecoderSession<E> {
    fn drop(&mut self) {
        self.release();
    }
}
