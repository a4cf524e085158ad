//! Thumbnail rendering seam
//!
//! The cache only needs raw 32-bit BGRA pixels for a path. Where they come from is up to
//! the [`IconRenderer`] handed to [`crate::indexer::CacheIndex`]; [`ThumbnailRenderer`] is
//! the default and needs nothing beyond the `image` crate.

mod thumbnail;

use std::path::Path;

pub use thumbnail::ThumbnailRenderer;

use crate::error::Result;
use crate::models::RenderedIcon;

/// Produces thumbnail pixels for a file system path
pub trait IconRenderer {
    /// Render the thumbnail for `path`
    ///
    /// Failures are per entry: the cache leaves that entry out and keeps going.
    fn render(&self, path: &Path) -> Result<RenderedIcon>;
}
