//! Binary primitives of the thumbnail cache file
//!
//! The cache is one flat byte stream of records with no count or separators:
//!
//! ```text
//! name (UTF-16LE, null-terminated) | BMP file header | BMP info header | pixels
//! ```
//!
//! The reader relies on each record's embedded `total_size` to find the next one.

pub mod bitmap;
pub mod buffer;

pub use bitmap::{BitmapRecord, HEADER_SIZE};
pub use buffer::ByteBuffer;
