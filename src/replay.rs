//! Packet dump reader
//!
//! Splits a recorded blob back into packets. A payload runs from the end of
//! one marker to the start of the next marker, or to the end of the blob.
//! Bytes before the first marker and empty payloads are dropped. Payloads
//! that themselves contain the marker sequence are split there; the format
//! has no escaping.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::Path;

use log::debug;

use crate::dump::PACKET_MARKER;
use crate::error::DumpReadError;

fn find_marker(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(PACKET_MARKER.len())
        .position(|w| w == PACKET_MARKER)
        .map(|pos| from + pos)
}

/// Byte ranges of every packet in `data`, in order
pub fn packet_ranges(data: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let Some(mut marker) = find_marker(data, 0) else {
        return ranges;
    };

    loop {
        let start = marker + PACKET_MARKER.len();
        let next = find_marker(data, start);
        let end = next.unwrap_or(data.len());
        if end > start {
            ranges.push(start..end);
        }
        match next {
            Some(pos) => marker = pos,
            None => break,
        }
    }

    ranges
}

/// Split `data` into packets borrowed from it
pub fn parse_packets(data: &[u8]) -> Vec<&[u8]> {
    packet_ranges(data)
        .into_iter()
        .map(|range| &data[range])
        .collect()
}

fn read_dump(path: &Path) -> Result<Vec<u8>, DumpReadError> {
    match fs::read(path) {
        Ok(data) => {
            debug!("Read {} byte dump from {}", data.len(), path.display());
            Ok(data)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(DumpReadError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(DumpReadError::ReadFailed(e)),
    }
}

/// Read every packet from a dump file
pub fn read_packets(path: impl AsRef<Path>) -> Result<Vec<Vec<u8>>, DumpReadError> {
    let data = read_dump(path.as_ref())?;
    Ok(parse_packets(&data).into_iter().map(<[u8]>::to_vec).collect())
}

/// Read a dump file and hand each packet to `callback`, in file order.
///
/// Returns the number of packets delivered.
pub fn read_packets_with<F>(path: impl AsRef<Path>, mut callback: F) -> Result<usize, DumpReadError>
where
    F: FnMut(&[u8]),
{
    let data = read_dump(path.as_ref())?;
    let ranges = packet_ranges(&data);
    for range in &ranges {
        callback(&data[range.clone()]);
    }
    Ok(ranges.len())
}
