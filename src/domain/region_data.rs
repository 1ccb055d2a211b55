//! Byte-buffer region serialization
//!
//! A serialized region is a fixed 32-byte little-endian header followed by an
//! array of 16-byte rectangles. The layout mirrors the classic GDI
//! `RGNDATAHEADER` contract so buffers can be handed to presentation APIs
//! that consume dirty-rect lists.

use thiserror::Error;

use crate::domain::core::Rect;

/// Size of the serialized header in bytes.
pub const HEADER_SIZE: usize = 32;
/// Size of one serialized rectangle in bytes.
pub const RECT_SIZE: usize = 16;
/// Record-kind marker for a rectangle-list payload.
pub const RECORD_KIND_RECTANGLES: u32 = 1;

/// Errors found while validating a serialized region buffer.
///
/// These never escape the public region API; a buffer that fails validation
/// is discarded and the decomposition degrades to an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionDataError {
    /// The buffer is smaller than the mandatory header.
    #[error("region data buffer truncated: {len} bytes")]
    Truncated { len: usize },
    /// The header's self-reported size is not the fixed header size.
    #[error("unexpected header size {size}")]
    BadHeaderSize { size: u32 },
    /// The record-kind marker is not the rectangle-list marker.
    #[error("unexpected record kind {kind}")]
    BadRecordKind { kind: u32 },
    /// The rectangle count and payload size disagree with each other or with
    /// the buffer length.
    #[error("inconsistent rectangle payload: count {count}, payload {rects_size} bytes")]
    SizeMismatch { count: u32, rects_size: u32 },
}

/// Header of a serialized region buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDataHeader {
    /// Header size in bytes; always [`HEADER_SIZE`].
    pub size: u32,
    /// Record-kind marker; always [`RECORD_KIND_RECTANGLES`].
    pub kind: u32,
    /// Number of rectangles in the payload.
    pub count: u32,
    /// Total payload size in bytes (`count * RECT_SIZE`).
    pub rects_size: u32,
    /// Bounding box of the serialized region.
    pub bounds: Rect,
}

impl RegionDataHeader {
    /// Builds the header for a rectangle-list payload.
    pub fn for_rects(count: u32, bounds: Rect) -> Self {
        Self {
            size: HEADER_SIZE as u32,
            kind: RECORD_KIND_RECTANGLES,
            count,
            rects_size: count * RECT_SIZE as u32,
            bounds,
        }
    }

    /// Appends the serialized header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&self.rects_size.to_le_bytes());
        write_rect(&self.bounds, out);
    }

    /// Parses and validates the header of a serialized region buffer.
    ///
    /// Checks the header size, the record-kind marker, and that the
    /// rectangle count, payload size, and buffer length all agree.
    pub fn parse(bytes: &[u8]) -> Result<Self, RegionDataError> {
        if bytes.len() < HEADER_SIZE {
            return Err(RegionDataError::Truncated { len: bytes.len() });
        }
        let size = read_u32(bytes, 0);
        let kind = read_u32(bytes, 4);
        let count = read_u32(bytes, 8);
        let rects_size = read_u32(bytes, 12);
        let bounds = read_rect(bytes, 16);

        if size != HEADER_SIZE as u32 {
            return Err(RegionDataError::BadHeaderSize { size });
        }
        if kind != RECORD_KIND_RECTANGLES {
            return Err(RegionDataError::BadRecordKind { kind });
        }
        let expected = count as usize * RECT_SIZE;
        if rects_size as usize != expected || bytes.len() != HEADER_SIZE + expected {
            return Err(RegionDataError::SizeMismatch { count, rects_size });
        }

        Ok(Self {
            size,
            kind,
            count,
            rects_size,
            bounds,
        })
    }
}

/// Appends a serialized rectangle to `out`.
pub fn write_rect(rect: &Rect, out: &mut Vec<u8>) {
    out.extend_from_slice(&rect.left.to_le_bytes());
    out.extend_from_slice(&rect.top.to_le_bytes());
    out.extend_from_slice(&rect.right.to_le_bytes());
    out.extend_from_slice(&rect.bottom.to_le_bytes());
}

/// Reads the rectangle serialized at `offset`.
///
/// The caller must have validated that the buffer holds `RECT_SIZE` bytes at
/// `offset`.
pub fn read_rect(bytes: &[u8], offset: usize) -> Rect {
    Rect {
        left: read_u32(bytes, offset) as i32,
        top: read_u32(bytes, offset + 4) as i32,
        right: read_u32(bytes, offset + 8) as i32,
        bottom: read_u32(bytes, offset + 12) as i32,
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}
