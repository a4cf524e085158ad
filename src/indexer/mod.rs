//! Directory scanning and the thumbnail cache index
//!
//! # Error Handling Strategy
//!
//! Errors about the target directory itself propagate to the caller. Everything about the
//! cache file or individual entries degrades gracefully:
//!
//! - **Missing or corrupt cache**: read as empty, which triggers a rebuild.
//! - **Failed thumbnails**: the entry is left out of the rebuilt cache.
//! - **Failed writes**: logged, the in-memory items still serve the current run.

pub mod cache_index;
pub mod scanner;

pub use cache_index::{CacheIndex, RebuildReport, SYNTHETIC_ITEM_COUNT, Staleness};
pub use scanner::{DirectoryLister, FsDirectoryLister};
