use crate::error::{CacheError, Result};
use crate::storage::buffer::read_terminated_text;
use crate::storage::{BitmapRecord, ByteBuffer};

/// A display name and its thumbnail
///
/// The name is stored null-terminated on disk, so it never contains `'\0'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    name: String,
    bitmap: BitmapRecord,
}

impl CacheItem {
    pub fn new(name: impl Into<String>, bitmap: BitmapRecord) -> Result<Self> {
        let name = name.into();
        if name.contains('\0') {
            return Err(CacheError::InvalidName { name });
        }
        Ok(Self { name, bitmap })
    }

    /// Build an item from a name that is not a directory entry, dropping any null characters
    pub fn with_sanitized_name(name: impl Into<String>, bitmap: BitmapRecord) -> Self {
        let name: String = name.into().chars().filter(|&c| c != '\0').collect();
        Self { name, bitmap }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bitmap(&self) -> &BitmapRecord {
        &self.bitmap
    }

    /// Append the null-terminated name, then the bitmap record
    pub fn append_to(&self, buffer: &mut ByteBuffer) {
        buffer.append_text(&self.name, true);
        self.bitmap.append_to(buffer);
    }

    /// Parse one item starting at `offset`, returning it with the number of bytes consumed
    pub fn parse_from(bytes: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, name_len) = read_terminated_text(bytes, offset)?;
        let (bitmap, bitmap_len) = BitmapRecord::from_serialized(bytes, offset + name_len)?;
        Ok((Self { name, bitmap }, name_len + bitmap_len))
    }
}

/// Serialize `items` back to back, in order
pub fn serialize_items(items: &[CacheItem]) -> ByteBuffer {
    let mut buffer = ByteBuffer::new();
    for item in items {
        item.append_to(&mut buffer);
    }
    buffer
}

/// Parse every record in `bytes` until the end of the stream
pub fn parse_items(bytes: &[u8]) -> Result<Vec<CacheItem>> {
    let mut items = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (item, consumed) = CacheItem::parse_from(bytes, pos)?;
        items.push(item);
        pos += consumed;
    }
    Ok(items)
}
