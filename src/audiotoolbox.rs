//! AudioToolbox AudioConverter bindings
//!
//! This module provides FFI declarations for the AudioConverter API and a
//! `CodecEngine` backed by it.

use std::mem;
use std::ptr;

use libc::{c_void, c_int};

use crate::engine::{CodecEngine, Converter, ConverterInfo, FillResult, PrimeInfo};
use crate::error::OsStatus;
use crate::format::{four_cc, PacketDescription, StreamDescription};
use crate::supplier::PacketSupplier;

/// AudioConverter opaque type
#[repr(C)]
pub struct OpaqueAudioConverter {
    _private: [u8; 0],
}

pub type AudioConverterRef = *mut OpaqueAudioConverter;
pub type AudioConverterPropertyID = u32;
pub type OSStatus = c_int;

#[repr(C)]
pub struct AudioBuffer {
    pub mNumberChannels: u32,
    pub mDataByteSize: u32,
    pub mData: *mut c_void,
}

#[repr(C)]
pub struct AudioBufferList {
    pub mNumberBuffers: u32,
    pub mBuffers: [AudioBuffer; 1],
}

#[repr(C)]
#[derive(Default)]
struct AudioConverterPrimeInfo {
    leadingFrames: u32,
    trailingFrames: u32,
}

pub type AudioConverterComplexInputDataProc = extern "C" fn(
    converter: AudioConverterRef,
    io_number_data_packets: *mut u32,
    io_data: *mut AudioBufferList,
    out_data_packet_description: *mut *mut PacketDescription,
    in_user_data: *mut c_void,
) -> OSStatus;

pub const kAudioConverterDecompressionMagicCookie: AudioConverterPropertyID = four_cc(b"dmgc");
pub const kAudioConverterCurrentInputStreamDescription: AudioConverterPropertyID = four_cc(b"acid");
pub const kAudioConverterCurrentOutputStreamDescription: AudioConverterPropertyID = four_cc(b"acod");
pub const kAudioConverterPrimeInfo: AudioConverterPropertyID = four_cc(b"prim");
pub const kAudioConverterPropertyMinimumInputBufferSize: AudioConverterPropertyID = four_cc(b"mibs");
pub const kAudioConverterPropertyMinimumOutputBufferSize: AudioConverterPropertyID = four_cc(b"mobs");
pub const kAudioConverterPropertyMaximumInputPacketSize: AudioConverterPropertyID = four_cc(b"xips");
pub const kAudioConverterPropertyMaximumOutputPacketSize: AudioConverterPropertyID = four_cc(b"xops");

// External C functions from AudioToolbox
#[link(name = "AudioToolbox", kind = "framework")]
extern "C" {
    /// Create a converter
    pub fn AudioConverterNew(
        in_source_format: *const StreamDescription,
        in_destination_format: *const StreamDescription,
        out_audio_converter: *mut AudioConverterRef,
    ) -> OSStatus;

    /// Destroy a converter
    pub fn AudioConverterDispose(in_audio_converter: AudioConverterRef) -> OSStatus;

    pub fn AudioConverterSetProperty(
        in_audio_converter: AudioConverterRef,
        in_property_id: AudioConverterPropertyID,
        in_property_data_size: u32,
        in_property_data: *const c_void,
    ) -> OSStatus;

    pub fn AudioConverterGetProperty(
        in_audio_converter: AudioConverterRef,
        in_property_id: AudioConverterPropertyID,
        io_property_data_size: *mut u32,
        out_property_data: *mut c_void,
    ) -> OSStatus;

    pub fn AudioConverterGetPropertyInfo(
        in_audio_converter: AudioConverterRef,
        in_property_id: AudioConverterPropertyID,
        out_size: *mut u32,
        out_writable: *mut u8,
    ) -> OSStatus;

    /// Convert using the pull callback for input
    pub fn AudioConverterFillComplexBuffer(
        in_audio_converter: AudioConverterRef,
        in_input_data_proc: AudioConverterComplexInputDataProc,
        in_input_data_proc_user_data: *mut c_void,
        io_output_data_packet_size: *mut u32,
        out_output_data: *mut AudioBufferList,
        out_packet_description: *mut PacketDescription,
    ) -> OSStatus;
}

/// Input callback: forwards the engine's request to the `PacketSupplier`
/// behind `in_user_data`.
extern "C" fn input_data_proc(
    _converter: AudioConverterRef,
    io_number_data_packets: *mut u32,
    io_data: *mut AudioBufferList,
    out_data_packet_description: *mut *mut PacketDescription,
    in_user_data: *mut c_void,
) -> OSStatus {
    // SAFETY: the converter passes valid pointers for the duration of the
    // callback, and in_user_data is the `&mut &mut dyn PacketSupplier` set up
    // by `fill_buffer`, which outlives the FillComplexBuffer call.
    unsafe {
        if in_user_data.is_null() {
            *io_number_data_packets = 0;
            return 0;
        }
        let requested = *io_number_data_packets;
        if requested == 0 {
            return 0;
        }

        let supplier = &mut *(in_user_data as *mut &mut dyn PacketSupplier);
        let Some(packet) = supplier.supply(requested) else {
            *io_number_data_packets = 0;
            return 0;
        };

        let list = &mut *io_data;
        list.mNumberBuffers = 1;
        list.mBuffers[0].mNumberChannels = packet.channels;
        list.mBuffers[0].mDataByteSize = packet.description.data_byte_size;
        list.mBuffers[0].mData = packet.data.as_ptr() as *mut c_void;
        *io_number_data_packets = 1;

        if !out_data_packet_description.is_null() {
            *out_data_packet_description = packet.description as *const PacketDescription as *mut PacketDescription;
        }
    }
    0
}

/// Engine backed by the system AAC-ELD decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioToolboxEngine;

impl CodecEngine for AudioToolboxEngine {
    type Converter = AudioToolboxConverter;

    fn create(
        &self,
        input: &StreamDescription,
        output: &StreamDescription,
    ) -> Result<Self::Converter, OsStatus> {
        let mut raw: AudioConverterRef = ptr::null_mut();
        // SAFETY: both descriptions are valid for the call; raw receives the handle.
        let status = unsafe { AudioConverterNew(input, output, &mut raw) };
        if status != 0 || raw.is_null() {
            return Err(OsStatus(status));
        }
        Ok(AudioToolboxConverter {
            raw,
            channels: output.channels_per_frame,
        })
    }
}

/// Live AudioConverter instance
pub struct AudioToolboxConverter {
    raw: AudioConverterRef,
    channels: u32,
}

impl AudioToolboxConverter {
    fn get_property<T: Default>(&self, id: AudioConverterPropertyID) -> Option<T> {
        let mut value = T::default();
        let mut size = mem::size_of::<T>() as u32;
        // SAFETY: value is a plain C struct or integer of `size` bytes.
        let status = unsafe {
            AudioConverterGetProperty(self.raw, id, &mut size, &mut value as *mut T as *mut c_void)
        };
        (status == 0).then_some(value)
    }

    fn property_size(&self, id: AudioConverterPropertyID) -> Option<u32> {
        let mut size = 0u32;
        // SAFETY: out_writable may be null.
        let status = unsafe { AudioConverterGetPropertyInfo(self.raw, id, &mut size, ptr::null_mut()) };
        (status == 0).then_some(size)
    }
}

impl Converter for AudioToolboxConverter {
    fn set_magic_cookie(&mut self, cookie: &[u8]) -> Result<(), OsStatus> {
        // SAFETY: the cookie bytes are valid for the duration of the call.
        let status = unsafe {
            AudioConverterSetProperty(
                self.raw,
                kAudioConverterDecompressionMagicCookie,
                cookie.len() as u32,
                cookie.as_ptr() as *const c_void,
            )
        };
        if status == 0 {
            Ok(())
        } else {
            Err(OsStatus(status))
        }
    }

    fn fill_buffer(
        &mut self,
        mut supplier: &mut dyn PacketSupplier,
        max_frames: u32,
        output: &mut [u8],
    ) -> FillResult {
        let mut list = AudioBufferList {
            mNumberBuffers: 1,
            mBuffers: [AudioBuffer {
                mNumberChannels: self.channels,
                mDataByteSize: output.len() as u32,
                mData: output.as_mut_ptr() as *mut c_void,
            }],
        };
        let mut frames = max_frames;
        let user_data = &mut supplier as *mut &mut dyn PacketSupplier as *mut c_void;

        // SAFETY: list points into `output`, sized for `max_frames` frames;
        // user_data stays valid until this call returns.
        let status = unsafe {
            AudioConverterFillComplexBuffer(
                self.raw,
                input_data_proc,
                user_data,
                &mut frames,
                &mut list,
                ptr::null_mut(),
            )
        };

        FillResult {
            status: OsStatus(status),
            frames,
        }
    }

    fn dispose(self) {
        // SAFETY: raw came from AudioConverterNew and is released only here.
        unsafe {
            AudioConverterDispose(self.raw);
        }
    }

    fn info(&self) -> ConverterInfo {
        ConverterInfo {
            input_description: self.get_property(kAudioConverterCurrentInputStreamDescription),
            output_description: self.get_property(kAudioConverterCurrentOutputStreamDescription),
            prime_info: self
                .get_property::<AudioConverterPrimeInfo>(kAudioConverterPrimeInfo)
                .map(|p| PrimeInfo {
                    leading_frames: p.leadingFrames,
                    trailing_frames: p.trailingFrames,
                }),
            magic_cookie_size: self.property_size(kAudioConverterDecompressionMagicCookie),
            min_input_buffer_size: self.get_property(kAudioConverterPropertyMinimumInputBufferSize),
            min_output_buffer_size: self.get_property(kAudioConverterPropertyMinimumOutputBufferSize),
            max_input_packet_size: self.get_property(kAudioConverterPropertyMaximumInputPacketSize),
            max_output_packet_size: self.get_property(kAudioConverterPropertyMaximumOutputPacketSize),
        }
    }
}
