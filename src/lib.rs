//! Stacky - popup launcher for a folder, backed by a persisted thumbnail cache
//!
//! Rendering a thumbnail for every entry of a folder is slow, so the thumbnails are kept in
//! one hidden cache file inside the folder and reused until the folder changes. This crate
//! provides:
//!
//! - The cache file format: a flat stream of named, self-contained BMP records
//! - Staleness detection against a live directory listing
//! - Rebuild and persistence of the cache when stale
//! - The menu model a popup UI draws from the cache
//!
//! # Example
//!
//! ```no_run
//! use stacky::{CacheIndex, Settings};
//!
//! let settings = Settings::default();
//! let mut index = CacheIndex::new("/home/alice/Stacks/Dev", &settings);
//! index.refresh()?;
//! for item in index.child_items() {
//!     println!("{}", item.name());
//! }
//! # Ok::<(), stacky::CacheError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod launcher;
pub mod models;
pub mod render;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::CacheError;
pub use indexer::{CacheIndex, DirectoryLister, FsDirectoryLister, RebuildReport, Staleness};
pub use launcher::{Menu, MenuRow};
pub use models::{CacheItem, DirEntryInfo, RenderedIcon};
pub use render::{IconRenderer, ThumbnailRenderer};
pub use storage::{BitmapRecord, ByteBuffer};
