//! Pull-side data supply for the codec engine
//!
//! During one fill call the engine asks for compressed packets on demand.
//! `FramePacketSource` answers with the single access unit it was built
//! around: the whole frame by reference, once.

use crate::format::PacketDescription;

/// One compressed packet handed to the engine
#[derive(Debug, Clone, Copy)]
pub struct SuppliedPacket<'a> {
    /// Packet bytes, borrowed from the caller's frame
    pub data: &'a [u8],
    /// Channel count of the compressed stream
    pub channels: u32,
    /// Descriptor spanning `data`; outlives the fill call that requested it
    pub description: &'a PacketDescription,
}

/// Source of compressed packets for the engine's pull callback
pub trait PacketSupplier {
    /// Supply packets for a request of `requested` packets.
    ///
    /// `None` means no data is available (zero packets supplied).
    fn supply(&mut self, requested: u32) -> Option<SuppliedPacket<'_>>;
}

/// Supplies exactly one access unit per decode call
#[derive(Debug)]
pub struct FramePacketSource<'a> {
    frame: &'a [u8],
    channels: u32,
    description: PacketDescription,
    supplied: bool,
}

impl<'a> FramePacketSource<'a> {
    pub fn new(frame: &'a [u8], channels: u32) -> Self {
        // Access units are bounded well below u32::MAX
        let len = u32::try_from(frame.len()).unwrap_or(u32::MAX);
        Self {
            frame,
            channels,
            description: PacketDescription::whole(len),
            supplied: false,
        }
    }

    /// Whether the frame has been handed to the engine
    pub fn is_exhausted(&self) -> bool {
        self.supplied
    }
}

impl PacketSupplier for FramePacketSource<'_> {
    fn supply(&mut self, requested: u32) -> Option<SuppliedPacket<'_>> {
        if requested == 0 || self.supplied {
            return None;
        }
        self.supplied = true;
        Some(SuppliedPacket {
            data: self.frame,
            channels: self.channels,
            description: &self.description,
        })
    }
}
