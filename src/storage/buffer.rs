//! Append-only growable byte store used to build and read the cache file

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CacheError, Result};

/// Width in bytes of one encoded text unit (UTF-16LE)
pub const TEXT_UNIT_BYTES: usize = 2;

/// Growable byte buffer with `size <= capacity` at all times
///
/// Appended bytes keep their logical offsets across growth. Growth reserves exactly
/// the newly required total, so `capacity` only ever moves when an append needs it.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Bytes in use
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Bytes allocated
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.grow(self.data.len() + bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append `text` as UTF-16LE, optionally followed by one null unit
    pub fn append_text(&mut self, text: &str, with_terminator: bool) {
        let units = text.encode_utf16().count() + usize::from(with_terminator);
        self.grow(self.data.len() + units * TEXT_UNIT_BYTES);
        for unit in text.encode_utf16() {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        if with_terminator {
            self.data.extend_from_slice(&0u16.to_le_bytes());
        }
    }

    /// Append the full contents of the file at `path`
    ///
    /// Returns the number of bytes appended. A missing or empty file is reported as
    /// [`CacheError::CacheFileMissing`], which callers treat as an empty cache.
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::CacheFileMissing { path: path.to_path_buf() });
            }
            Err(e) => return Err(CacheError::Io(e)),
        };

        if bytes.is_empty() {
            return Err(CacheError::CacheFileMissing { path: path.to_path_buf() });
        }

        self.append_bytes(&bytes);
        Ok(bytes.len())
    }

    /// Write the full content to `path`, truncating any existing file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.data)
            .map_err(|source| CacheError::PersistFailure { path: path.to_path_buf(), source })
    }

    /// Free the backing storage. Calling it again is a no-op.
    pub fn release(&mut self) {
        self.data = Vec::new();
    }

    fn grow(&mut self, required: usize) {
        if self.data.capacity() >= required {
            return;
        }
        self.data.reserve_exact(required - self.data.len());
    }
}

/// Read a null-terminated UTF-16LE run starting at `offset`
///
/// Returns the decoded text and the number of bytes consumed, terminator included.
pub fn read_terminated_text(bytes: &[u8], offset: usize) -> Result<(String, usize)> {
    let tail = bytes
        .get(offset..)
        .ok_or_else(|| CacheError::malformed(offset, "name starts past end of buffer"))?;

    let mut units = Vec::new();
    for chunk in tail.chunks(TEXT_UNIT_BYTES) {
        if chunk.len() < TEXT_UNIT_BYTES {
            break;
        }
        let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
        if unit == 0 {
            let text = String::from_utf16(&units)
                .map_err(|e| CacheError::malformed(offset, format!("invalid name encoding: {e}")))?;
            return Ok((text, (units.len() + 1) * TEXT_UNIT_BYTES));
        }
        units.push(unit);
    }

    Err(CacheError::malformed(offset, "unterminated name"))
}
