//! Self-describing thumbnail record
//!
//! Each record is laid out exactly like a 32-bit uncompressed BMP file, so one record
//! cut out of the cache is a valid image on its own:
//!
//! ```text
//! file_header   14 bytes  "BM", total_size u32, reserved u16 x2, pixel offset u32 (= 54)
//! info_header   40 bytes  size, width i32, height i32, planes, bit count (= 32), compression (= 0), ...
//! pixel_bytes   width * |height| * 4 bytes, BGRA
//! ```
//!
//! All integers are little-endian. A negative height means the rows are stored top-down.

use super::buffer::ByteBuffer;
use crate::error::{CacheError, Result};

pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;
pub const HEADER_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

pub const BITS_PER_PIXEL: u16 = 32;
const BYTES_PER_PIXEL: usize = 4;
const BMP_SIGNATURE: u16 = 0x4D42;
const COMPRESSION_NONE: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FileHeader {
    signature: u16,
    total_size: u32,
    reserved1: u16,
    reserved2: u16,
    pixel_offset: u32,
}

impl FileHeader {
    fn for_total_size(total_size: u32) -> Self {
        Self {
            signature: BMP_SIGNATURE,
            total_size,
            reserved1: 0,
            reserved2: 0,
            pixel_offset: HEADER_SIZE as u32,
        }
    }

    fn to_bytes(self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.signature.to_le_bytes());
        out[2..6].copy_from_slice(&self.total_size.to_le_bytes());
        out[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        out[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        out[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        out
    }

    /// `bytes` must hold at least [`FILE_HEADER_SIZE`] bytes
    fn parse(bytes: &[u8]) -> Self {
        Self {
            signature: read_u16(bytes, 0),
            total_size: read_u32(bytes, 2),
            reserved1: read_u16(bytes, 6),
            reserved2: read_u16(bytes, 8),
            pixel_offset: read_u32(bytes, 10),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InfoHeader {
    header_size: u32,
    width: i32,
    height: i32,
    planes: u16,
    bit_count: u16,
    compression: u32,
    image_size: u32,
    x_pels_per_meter: i32,
    y_pels_per_meter: i32,
    colors_used: u32,
    colors_important: u32,
}

impl InfoHeader {
    fn new(width: i32, height: i32) -> Self {
        Self {
            header_size: INFO_HEADER_SIZE as u32,
            width,
            height,
            planes: 1,
            bit_count: BITS_PER_PIXEL,
            compression: COMPRESSION_NONE,
            ..Self::default()
        }
    }

    fn to_bytes(self) -> [u8; INFO_HEADER_SIZE] {
        let mut out = [0u8; INFO_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        out[4..8].copy_from_slice(&self.width.to_le_bytes());
        out[8..12].copy_from_slice(&self.height.to_le_bytes());
        out[12..14].copy_from_slice(&self.planes.to_le_bytes());
        out[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        out[16..20].copy_from_slice(&self.compression.to_le_bytes());
        out[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.x_pels_per_meter.to_le_bytes());
        out[28..32].copy_from_slice(&self.y_pels_per_meter.to_le_bytes());
        out[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        out[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        out
    }

    /// `bytes` must hold at least [`INFO_HEADER_SIZE`] bytes
    fn parse(bytes: &[u8]) -> Self {
        Self {
            header_size: read_u32(bytes, 0),
            width: read_u32(bytes, 4) as i32,
            height: read_u32(bytes, 8) as i32,
            planes: read_u16(bytes, 12),
            bit_count: read_u16(bytes, 14),
            compression: read_u32(bytes, 16),
            image_size: read_u32(bytes, 20),
            x_pels_per_meter: read_u32(bytes, 24) as i32,
            y_pels_per_meter: read_u32(bytes, 28) as i32,
            colors_used: read_u32(bytes, 32),
            colors_important: read_u32(bytes, 36),
        }
    }
}

/// One thumbnail: BMP headers plus owned BGRA pixel bytes
///
/// Invariant: `pixels.len() == width * |height| * 4 == total_size - HEADER_SIZE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitmapRecord {
    file_header: FileHeader,
    info_header: InfoHeader,
    pixels: Vec<u8>,
}

impl BitmapRecord {
    /// Build a record from freshly rendered 32-bit pixels
    pub fn from_pixels(pixels: &[u8], width: i32, height: i32) -> Result<Self> {
        let expected = pixel_byte_count_for(width, height)
            .ok_or_else(|| CacheError::invalid_dimensions(width, height, "negative width or overflow"))?;
        if pixels.len() != expected {
            return Err(CacheError::invalid_dimensions(
                width,
                height,
                format!("{} pixel bytes, expected {}", pixels.len(), expected),
            ));
        }

        let total_size = u32::try_from(HEADER_SIZE + expected)
            .map_err(|_| CacheError::invalid_dimensions(width, height, "too large for a cache record"))?;

        Ok(Self {
            file_header: FileHeader::for_total_size(total_size),
            info_header: InfoHeader::new(width, height),
            pixels: pixels.to_vec(),
        })
    }

    /// A valid 0x0 record, used where a thumbnail could not be produced but a record must exist
    pub fn blank() -> Self {
        Self {
            file_header: FileHeader::for_total_size(HEADER_SIZE as u32),
            info_header: InfoHeader::new(0, 0),
            pixels: Vec::new(),
        }
    }

    /// Parse a record starting at `offset`, returning it with the number of bytes consumed
    pub fn from_serialized(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let remaining = bytes.len().saturating_sub(offset);
        if remaining < HEADER_SIZE {
            return Err(CacheError::malformed(
                offset,
                format!("{remaining} bytes left, record headers need {HEADER_SIZE}"),
            ));
        }

        let file_header = FileHeader::parse(&bytes[offset..]);
        if file_header.signature != BMP_SIGNATURE {
            return Err(CacheError::malformed(offset, "missing BM signature"));
        }

        let total_size = file_header.total_size as usize;
        if total_size < HEADER_SIZE {
            return Err(CacheError::malformed(
                offset,
                format!("declared size {total_size} is smaller than the headers"),
            ));
        }
        if total_size > remaining {
            return Err(CacheError::malformed(
                offset,
                format!("declared size {total_size} exceeds the {remaining} bytes left"),
            ));
        }

        let info_header = InfoHeader::parse(&bytes[offset + FILE_HEADER_SIZE..]);
        if info_header.bit_count != BITS_PER_PIXEL || info_header.compression != COMPRESSION_NONE {
            return Err(CacheError::malformed(
                offset,
                format!(
                    "unsupported pixel format ({} bpp, compression {})",
                    info_header.bit_count, info_header.compression
                ),
            ));
        }

        let bits_size = total_size - HEADER_SIZE;
        if pixel_byte_count_for(info_header.width, info_header.height) != Some(bits_size) {
            return Err(CacheError::malformed(
                offset,
                format!(
                    "{}x{} image does not fit {} pixel bytes",
                    info_header.width, info_header.height, bits_size
                ),
            ));
        }

        let start = offset + HEADER_SIZE;
        let pixels = bytes[start..start + bits_size].to_vec();

        Ok((Self { file_header, info_header, pixels }, total_size))
    }

    /// Append headers then pixels; this order is the on-disk layout
    pub fn append_to(&self, buffer: &mut ByteBuffer) {
        buffer.append_bytes(&self.file_header.to_bytes());
        buffer.append_bytes(&self.info_header.to_bytes());
        buffer.append_bytes(&self.pixels);
    }

    pub fn total_size(&self) -> usize {
        self.file_header.total_size as usize
    }

    pub fn pixel_byte_count(&self) -> usize {
        self.total_size().saturating_sub(HEADER_SIZE)
    }

    pub fn width(&self) -> i32 {
        self.info_header.width
    }

    /// Signed height; negative means top-down row order
    pub fn height(&self) -> i32 {
        self.info_header.height
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.info_header.bit_count
    }

    pub fn is_top_down(&self) -> bool {
        self.info_header.height < 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Free the pixels and zero both headers
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

/// `width * |height| * 4`, or `None` for negative widths and overflow
pub fn pixel_byte_count_for(width: i32, height: i32) -> Option<usize> {
    let width = usize::try_from(width).ok()?;
    let rows = height.unsigned_abs() as usize;
    width.checked_mul(rows)?.checked_mul(BYTES_PER_PIXEL)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
