//! Error taxonomy for the cache subsystem
//!
//! Failures about the target directory itself are fatal and propagate to the caller.
//! Failures about individual entries or the cache file are recovered inside
//! [`crate::indexer::CacheIndex`] and only surface as log warnings.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cannot read directory '{path}': {source}")]
    DirectoryUnreadable { path: PathBuf, source: std::io::Error },

    #[error("Cache file does not exist or is empty: {path}")]
    CacheFileMissing { path: PathBuf },

    #[error("Malformed cache record at byte {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    #[error("Failed to render icon for '{path}': {reason}")]
    IconRenderFailure { path: PathBuf, reason: String },

    #[error("Failed to write cache file '{path}': {source}")]
    PersistFailure { path: PathBuf, source: std::io::Error },

    #[error("Invalid thumbnail dimensions {width}x{height}: {reason}")]
    InvalidDimensions { width: i32, height: i32, reason: String },

    #[error("Entry name contains a null character: {name:?}")]
    InvalidName { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord { offset, reason: reason.into() }
    }

    pub fn invalid_dimensions(width: i32, height: i32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions { width, height, reason: reason.into() }
    }

    pub fn render_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::IconRenderFailure { path: path.into(), reason: reason.to_string() }
    }

    /// True for the errors that mean "no usable cache on disk", which callers treat as empty
    pub fn is_recoverable_cache_error(&self) -> bool {
        matches!(self, Self::CacheFileMissing { .. } | Self::MalformedRecord { .. })
    }
}
