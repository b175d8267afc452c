//! AAC-ELD Audio Specific Config builder
//!
//! Produces the 4-byte out-of-band descriptor the decoder needs before the
//! first access unit. Only the AAC-ELD subset used by the stream is covered:
//!
//! | Field              | Values                          |
//! |--------------------|---------------------------------|
//! | audioObjectType    | 39 (escaped: `11111` + `000111`) |
//! | sampling frequency | 48000 (index 3), 44100 (index 4) |
//! | channels           | 1, 2                            |
//! | frame length       | 512 (flag 0), 480 (flag 1)      |
//!
//! Example for 44.1 kHz stereo with 480-sample frames: `F8 E8 50 00`.

use crate::error::AscError;

/// Length of the generated config in bytes
pub const ASC_LEN: usize = 4;

/// Audio object type for AAC-ELD
pub const AOT_ER_AAC_ELD: u8 = 39;

/// Object types at or above this value use the 5+6 bit escape encoding
const AOT_ESCAPE_BASE: u8 = 32;

/// Build the Audio Specific Config for an AAC-ELD stream.
pub fn build_asc(
    sample_rate: u32,
    channels: u32,
    frame_duration: u32,
) -> Result<[u8; ASC_LEN], AscError> {
    let mut asc = [0u8; ASC_LEN];

    // 5 bits of 31 (escape) followed by 6 bits of (39 - 32) = 000111.
    // Byte 0 carries the escape, byte 1 the top 3 bits of the extension.
    let extension = AOT_ER_AAC_ELD - AOT_ESCAPE_BASE;
    asc[0] |= 0x1F << 3;
    asc[1] |= (extension & 0x07) << 5;

    asc[1] |= match sample_rate {
        48000 => 0x06,
        44100 => 0x08,
        other => return Err(AscError::UnsupportedSampleRate(other)),
    };

    asc[2] |= match channels {
        1 => 0x20,
        2 => 0x40,
        other => return Err(AscError::UnsupportedChannelCount(other)),
    };

    // frameLengthFlag
    asc[2] |= match frame_duration {
        512 => 0x00,
        480 => 0x10,
        other => return Err(AscError::UnsupportedFrameDuration(other)),
    };

    Ok(asc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stream_config() {
        assert_eq!(build_asc(44100, 2, 480), Ok([0xF8, 0xE8, 0x50, 0x00]));
    }

    #[test]
    fn test_all_supported_combinations() {
        let cases = [
            (48000, 1, 512, [0xF8, 0xE6, 0x20, 0x00]),
            (48000, 1, 480, [0xF8, 0xE6, 0x30, 0x00]),
            (48000, 2, 512, [0xF8, 0xE6, 0x40, 0x00]),
            (48000, 2, 480, [0xF8, 0xE6, 0x50, 0x00]),
            (44100, 1, 512, [0xF8, 0xE8, 0x20, 0x00]),
            (44100, 1, 480, [0xF8, 0xE8, 0x30, 0x00]),
            (44100, 2, 512, [0xF8, 0xE8, 0x40, 0x00]),
            (44100, 2, 480, [0xF8, 0xE8, 0x50, 0x00]),
        ];
        for (rate, channels, duration, expected) in cases {
            assert_eq!(
                build_asc(rate, channels, duration),
                Ok(expected),
                "{rate} Hz, {channels} ch, {duration} samples"
            );
        }
    }

    #[test]
    fn test_escaped_object_type_bits() {
        let asc = build_asc(48000, 2, 512).unwrap();
        // 11111 | 000111 across the first 11 bits
        let head = (u16::from(asc[0]) << 3) | (u16::from(asc[1]) >> 5);
        assert_eq!(head >> 6, 31);
        assert_eq!(head & 0x3F, u16::from(AOT_ER_AAC_ELD - 32));
        assert_eq!(asc[3], 0);
    }

    #[test]
    fn test_unsupported_sample_rate() {
        assert_eq!(
            build_asc(32000, 2, 480),
            Err(AscError::UnsupportedSampleRate(32000))
        );
    }

    #[test]
    fn test_unsupported_channel_count() {
        assert_eq!(build_asc(48000, 0, 480), Err(AscError::UnsupportedChannelCount(0)));
        assert_eq!(build_asc(48000, 6, 480), Err(AscError::UnsupportedChannelCount(6)));
    }

    #[test]
    fn test_unsupported_frame_duration() {
        assert_eq!(
            build_asc(44100, 1, 1024),
            Err(AscError::UnsupportedFrameDuration(1024))
        );
    }
}
