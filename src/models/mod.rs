//! Data models for the launcher cache.
//!
//! - [`CacheItem`] - One menu entry: display name plus its thumbnail record
//! - [`DirEntryInfo`] - One child reported by a directory listing
//! - [`RenderedIcon`] - Raw pixels returned by an icon renderer

pub mod cache_item;
pub mod entry;

pub use cache_item::CacheItem;
pub use entry::{DirEntryInfo, RenderedIcon};
