//! Capture file loading and global header validation.

use crate::analyzer::config::*;
use crate::error::{AnalyzerError, FormatError, Result};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Byte order of the capture and record headers. Protocol headers inside the
/// frames are always big-endian and do not depend on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Reads a `u32` at `offset`. Callers guarantee four bytes are present.
    pub fn u32_at(self, data: &[u8], offset: usize) -> u32 {
        let bytes = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian    => u32::from_be_bytes(bytes),
        }
    }

    pub fn u16_at(self, data: &[u8], offset: usize) -> u16 {
        let bytes = [data[offset], data[offset + 1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian    => u16::from_be_bytes(bytes),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian    => "big-endian",
        }
    }
}

/// The 24-byte pcap global header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureHeader {
    pub magic:         u32,
    pub byte_order:    ByteOrder,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT offset; carried but never applied.
    pub thiszone:      i32,
    /// Timestamp accuracy; carried but never applied.
    pub sigfigs:       u32,
    pub snaplen:       u32,
    pub linktype:      u32,
}

impl CaptureHeader {
    pub fn is_ethernet(&self) -> bool {
        self.linktype == LINKTYPE_ETHERNET
    }

    pub fn version(&self) -> String {
        format!("{}.{}", self.version_major, self.version_minor)
    }
}

/// Validates the global header and splits it off the record area.
///
/// The magic is read little-endian: `0xa1b2c3d4` means the writer was
/// little-endian, `0xd4c3b2a1` means big-endian. Anything else, or fewer
/// than 24 bytes, is a [`FormatError`].
pub fn parse_capture(data: &[u8]) -> std::result::Result<(CaptureHeader, &[u8]), FormatError> {
    if data.len() < GLOBAL_HEADER_SIZE {
        return Err(FormatError::TruncatedGlobalHeader {
            needed: GLOBAL_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let magic = ByteOrder::LittleEndian.u32_at(data, 0);
    let byte_order = match magic {
        MAGIC_LITTLE_ENDIAN => ByteOrder::LittleEndian,
        MAGIC_BIG_ENDIAN    => ByteOrder::BigEndian,
        other => return Err(FormatError::UnknownMagic(other)),
    };

    let header = CaptureHeader {
        magic,
        byte_order,
        version_major: byte_order.u16_at(data, 4),
        version_minor: byte_order.u16_at(data, 6),
        thiszone:      byte_order.u32_at(data, 8) as i32,
        sigfigs:       byte_order.u32_at(data, 12),
        snaplen:       byte_order.u32_at(data, 16),
        linktype:      byte_order.u32_at(data, 20),
    };

    Ok((header, &data[GLOBAL_HEADER_SIZE..]))
}

/// Reads the whole capture into memory.
///
/// A missing file becomes [`AnalyzerError::FileNotFound`] so the caller can
/// report it distinctly from other I/O failures.
pub fn read_capture_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AnalyzerError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => AnalyzerError::Io(e),
    })
}
