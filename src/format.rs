//! Stream format descriptions
//!
//! `InputFormat` and `OutputFormat` are what callers configure. They are
//! expanded into `StreamDescription` values, which mirror the C layout of
//! an `AudioStreamBasicDescription` so they can cross the engine boundary
//! unchanged.

use crate::error::DecoderError;

/// Build a four-character code
#[inline]
pub const fn four_cc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Format id for an AAC-ELD elementary stream ('aace')
pub const FORMAT_MPEG4_AAC_ELD: u32 = four_cc(b"aace");
/// Format id for linear PCM ('lpcm')
pub const FORMAT_LINEAR_PCM: u32 = four_cc(b"lpcm");

pub const FORMAT_FLAG_IS_FLOAT: u32 = 1 << 0;
pub const FORMAT_FLAG_IS_SIGNED_INTEGER: u32 = 1 << 2;
pub const FORMAT_FLAG_IS_PACKED: u32 = 1 << 3;
pub const FORMAT_FLAG_IS_NON_INTERLEAVED: u32 = 1 << 5;

/// AAC-ELD input format configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFormat {
    /// Sampling rate of the encoded stream in Hz
    pub sample_rate: f64,
    /// Channel count in the encoded stream
    pub channels: u32,
    /// Frames per access unit; bounds the decoded output of one call
    pub frames_per_packet: u32,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            frames_per_packet: 480,
        }
    }
}

impl InputFormat {
    pub fn new(sample_rate: f64, channels: u32, frames_per_packet: u32) -> Self {
        Self {
            sample_rate,
            channels,
            frames_per_packet,
        }
    }

    fn validate(&self) -> Result<(), DecoderError> {
        if !(self.sample_rate > 0.0) {
            return Err(DecoderError::InvalidFormat("input sample rate must be positive"));
        }
        if self.channels == 0 {
            return Err(DecoderError::InvalidFormat("input channel count must be non-zero"));
        }
        if self.frames_per_packet == 0 {
            return Err(DecoderError::InvalidFormat("frames per packet must be non-zero"));
        }
        Ok(())
    }

    /// Describe the compressed stream.
    ///
    /// Packet and frame byte sizes are zero: access units are variable-sized.
    pub fn stream_description(&self) -> Result<StreamDescription, DecoderError> {
        self.validate()?;
        Ok(StreamDescription {
            sample_rate: self.sample_rate,
            format_id: FORMAT_MPEG4_AAC_ELD,
            format_flags: 0,
            bytes_per_packet: 0,
            frames_per_packet: self.frames_per_packet,
            bytes_per_frame: 0,
            channels_per_frame: self.channels,
            bits_per_channel: 0,
            reserved: 0,
        })
    }
}

/// PCM output format configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputFormat {
    /// Sampling rate of the decoded stream in Hz
    pub sample_rate: f64,
    /// Interleaved channels per PCM frame
    pub channels: u32,
    /// Bit depth per sample; a multiple of 8
    pub bits_per_channel: u32,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            bits_per_channel: 16,
        }
    }
}

impl OutputFormat {
    pub fn new(sample_rate: f64, channels: u32, bits_per_channel: u32) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_channel,
        }
    }

    /// Bytes in one interleaved PCM frame across all channels.
    ///
    /// Saturates for formats that `stream_description` would reject.
    #[inline]
    pub fn bytes_per_frame(&self) -> u32 {
        self.checked_bytes_per_frame().unwrap_or(u32::MAX)
    }

    fn checked_bytes_per_frame(&self) -> Option<u32> {
        self.channels.checked_mul(self.bits_per_channel / 8)
    }

    fn validate(&self) -> Result<(), DecoderError> {
        if !(self.sample_rate > 0.0) {
            return Err(DecoderError::InvalidFormat("output sample rate must be positive"));
        }
        if self.channels == 0 {
            return Err(DecoderError::InvalidFormat("output channel count must be non-zero"));
        }
        if self.bits_per_channel == 0 || self.bits_per_channel % 8 != 0 {
            return Err(DecoderError::InvalidFormat(
                "bits per channel must be a non-zero multiple of 8",
            ));
        }
        if self.checked_bytes_per_frame().is_none() {
            return Err(DecoderError::InvalidFormat("bytes per frame overflows"));
        }
        Ok(())
    }

    /// Describe the decoded stream: packed, interleaved signed-integer PCM
    /// with one frame per packet.
    pub fn stream_description(&self) -> Result<StreamDescription, DecoderError> {
        self.validate()?;
        let bytes_per_frame = self.bytes_per_frame();
        Ok(StreamDescription {
            sample_rate: self.sample_rate,
            format_id: FORMAT_LINEAR_PCM,
            format_flags: FORMAT_FLAG_IS_SIGNED_INTEGER | FORMAT_FLAG_IS_PACKED,
            bytes_per_packet: bytes_per_frame,
            frames_per_packet: 1,
            bytes_per_frame,
            channels_per_frame: self.channels,
            bits_per_channel: self.bits_per_channel,
            reserved: 0,
        })
    }
}

/// Largest PCM buffer one decode call may allocate
pub const MAX_PCM_BUFFER_BYTES: usize = 1 << 24;

/// Size of the output buffer for one access unit:
/// `frames_per_packet * bytes_per_frame`, bounded by [`MAX_PCM_BUFFER_BYTES`].
pub fn pcm_buffer_len(input: &InputFormat, output: &OutputFormat) -> Result<usize, DecoderError> {
    let bytes_per_frame = output
        .checked_bytes_per_frame()
        .ok_or(DecoderError::InvalidFormat("bytes per frame overflows"))?;
    (input.frames_per_packet as usize)
        .checked_mul(bytes_per_frame as usize)
        .filter(|&len| len <= MAX_PCM_BUFFER_BYTES)
        .ok_or(DecoderError::InvalidFormat("PCM buffer for one packet is too large"))
}

/// Stream description in the engine's C layout
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamDescription {
    pub sample_rate: f64,
    pub format_id: u32,
    pub format_flags: u32,
    pub bytes_per_packet: u32,
    pub frames_per_packet: u32,
    pub bytes_per_frame: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
    pub reserved: u32,
}

impl StreamDescription {
    pub fn is_non_interleaved(&self) -> bool {
        self.format_flags & FORMAT_FLAG_IS_NON_INTERLEAVED != 0
    }
}

/// Location of one compressed packet within a buffer (C layout)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketDescription {
    pub start_offset: i64,
    pub variable_frames_in_packet: u32,
    pub data_byte_size: u32,
}

impl PacketDescription {
    /// A description spanning a whole access unit of `len` bytes
    pub fn whole(len: u32) -> Self {
        Self {
            start_offset: 0,
            variable_frames_in_packet: 0,
            data_byte_size: len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_cc_values() {
        assert_eq!(FORMAT_MPEG4_AAC_ELD, 0x6161_6365);
        assert_eq!(FORMAT_LINEAR_PCM, 0x6C70_636D);
    }

    #[test]
    fn test_default_output_derived_fields() {
        let desc = OutputFormat::default().stream_description().unwrap();
        assert_eq!(desc.bytes_per_frame, 4);
        assert_eq!(desc.bytes_per_packet, 4);
        assert_eq!(desc.frames_per_packet, 1);
        assert_eq!(
            desc.format_flags,
            FORMAT_FLAG_IS_SIGNED_INTEGER | FORMAT_FLAG_IS_PACKED
        );
        assert!(!desc.is_non_interleaved());
    }

    #[test]
    fn test_mono_24_bit_output() {
        let desc = OutputFormat::new(48000.0, 1, 24).stream_description().unwrap();
        assert_eq!(desc.bytes_per_frame, 3);
        assert_eq!(desc.bytes_per_packet, 3);
    }

    #[test]
    fn test_input_description_is_variable_sized() {
        let desc = InputFormat::default().stream_description().unwrap();
        assert_eq!(desc.format_id, FORMAT_MPEG4_AAC_ELD);
        assert_eq!(desc.frames_per_packet, 480);
        assert_eq!(desc.channels_per_frame, 2);
        assert_eq!(desc.bytes_per_packet, 0);
        assert_eq!(desc.bytes_per_frame, 0);
        assert_eq!(desc.bits_per_channel, 0);
    }

    #[test]
    fn test_rejects_partial_byte_depth() {
        let err = OutputFormat::new(44100.0, 2, 12).stream_description().unwrap_err();
        assert!(matches!(err, DecoderError::InvalidFormat(_)));
    }

    #[test]
    fn test_rejects_zero_frames_per_packet() {
        let err = InputFormat::new(44100.0, 2, 0).stream_description().unwrap_err();
        assert!(matches!(err, DecoderError::InvalidFormat(_)));
    }

    #[test]
    fn test_rejects_overflowing_frame_size() {
        let err = OutputFormat::new(44100.0, u32::MAX / 2, 32)
            .stream_description()
            .unwrap_err();
        assert!(matches!(err, DecoderError::InvalidFormat(_)));
    }

    #[test]
    fn test_pcm_buffer_len() {
        let len = pcm_buffer_len(&InputFormat::default(), &OutputFormat::default()).unwrap();
        assert_eq!(len, 1920);

        let huge = InputFormat::new(44100.0, 2, u32::MAX);
        let err = pcm_buffer_len(&huge, &OutputFormat::new(44100.0, 8, 32)).unwrap_err();
        assert!(matches!(err, DecoderError::InvalidFormat(_)));
    }

    #[test]
    fn test_c_layout_sizes() {
        assert_eq!(std::mem::size_of::<StreamDescription>(), 40);
        assert_eq!(std::mem::size_of::<PacketDescription>(), 16);
    }
}
