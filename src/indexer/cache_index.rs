//! Thumbnail cache for one target directory.
//!
//! # Lifecycle
//!
//! [`CacheIndex::scan`] lists the directory, [`CacheIndex::load`] reads the cache file and
//! rebuilds it when it no longer matches the listing, [`CacheIndex::rebuild`] renders every
//! entry again and [`CacheIndex::persist`] replaces the cache file as a unit.
//!
//! # Error Handling Strategy
//!
//! - **Target directory**: an unreadable directory is fatal and propagates to the caller.
//! - **Cache file**: missing, unreadable or malformed content is treated as an empty cache,
//!   which is stale, so the next step is a rebuild. Nothing about it is reported as an error.
//! - **Entries**: a failed thumbnail drops that entry from the rebuilt cache with a warning.
//!   The resulting cache no longer matches the listing, so the next run retries the rebuild.
//! - **Persisting**: a failed write is a warning. The in-memory items stay valid for this run.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{CacheError, Result};
use crate::indexer::scanner::{DirectoryLister, FsDirectoryLister, mark_hidden};
use crate::models::CacheItem;
use crate::models::cache_item::{parse_items, serialize_items};
use crate::render::{IconRenderer, ThumbnailRenderer};
use crate::storage::{BitmapRecord, ByteBuffer};

/// Number of items at the head of [`CacheIndex::items`] that are not directory children
pub const SYNTHETIC_ITEM_COUNT: usize = 1;

/// Why a loaded cache does not match the scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// An entry was modified after the cache file was written
    EntryModified { entry_nanos: i64, cache_nanos: i64 },
    /// No cache items were loaded
    Empty,
    /// The number of cached children differs from the number of scanned entries
    CountMismatch { scanned: usize, cached: usize },
    /// A scanned entry differs from the cached child at the same position
    NameMismatch { position: usize, scanned: String, cached: String },
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryModified { entry_nanos, cache_nanos } => {
                let lag = entry_nanos.saturating_sub(*cache_nanos);
                write!(f, "entry modified {lag} ns after the cache was written")
            }
            Self::Empty => write!(f, "cache is empty"),
            Self::CountMismatch { scanned, cached } => {
                write!(f, "{scanned} entries scanned, {cached} cached")
            }
            Self::NameMismatch { position, scanned, cached } => {
                write!(f, "entry {position} is {scanned:?}, cache has {cached:?}")
            }
        }
    }
}

/// Outcome of one [`CacheIndex::rebuild`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Items now held, synthetic item included
    pub item_count: usize,
    /// Entries left out because their thumbnail could not be produced
    pub skipped: Vec<String>,
    /// Set when the cache file could not be written
    pub persist_error: Option<String>,
}

impl RebuildReport {
    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Ordered thumbnail cache for one target directory
///
/// Item 0 is always the synthetic "open this folder" entry. After a successful load, item
/// `i + 1` corresponds to scanned entry `i`.
pub struct CacheIndex {
    target_dir: PathBuf,
    cache_file_path: PathBuf,
    cache_file_name: String,
    open_label: String,
    lister: Box<dyn DirectoryLister>,
    renderer: Box<dyn IconRenderer>,
    items: Vec<CacheItem>,
    cache_file_modified: i64,
    scanned_names: Vec<String>,
    scanned_paths: Vec<PathBuf>,
    scanned_max_modified: i64,
    was_rebuilt: bool,
    last_rebuild: Option<RebuildReport>,
}

impl CacheIndex {
    /// Bind a cache to `target_dir`, using the file system lister and the default renderer
    pub fn new(target_dir: impl Into<PathBuf>, settings: &Settings) -> Self {
        // collecting components drops any trailing separator
        let target_dir: PathBuf = target_dir.into().components().collect();
        let cache_file_path = target_dir.join(&settings.cache_file_name);

        Self {
            target_dir,
            cache_file_path,
            cache_file_name: settings.cache_file_name.clone(),
            open_label: settings.open_label.clone(),
            lister: Box::new(FsDirectoryLister),
            renderer: Box::new(ThumbnailRenderer::new(settings.thumbnail_size)),
            items: Vec::new(),
            cache_file_modified: 0,
            scanned_names: Vec::new(),
            scanned_paths: Vec::new(),
            scanned_max_modified: 0,
            was_rebuilt: false,
            last_rebuild: None,
        }
    }

    pub fn with_lister(mut self, lister: impl DirectoryLister + 'static) -> Self {
        self.lister = Box::new(lister);
        self
    }

    pub fn with_renderer(mut self, renderer: impl IconRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Scan then load, rebuilding when stale
    pub fn refresh(&mut self) -> Result<()> {
        self.scan()?;
        self.load();
        Ok(())
    }

    /// List the visible children of the target directory
    ///
    /// Hidden entries and the cache file itself are skipped. Names keep enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DirectoryUnreadable`] if the target directory cannot be opened.
    pub fn scan(&mut self) -> Result<()> {
        let entries = self.lister.enumerate(&self.target_dir)?;

        self.scanned_names.clear();
        self.scanned_paths.clear();
        self.scanned_max_modified = 0;
        let mut hidden = 0;

        for entry in entries {
            if entry.is_hidden || entry.name == self.cache_file_name {
                hidden += 1;
                continue;
            }
            self.scanned_max_modified = self.scanned_max_modified.max(entry.modified_nanos);
            self.scanned_names.push(entry.name);
            self.scanned_paths.push(entry.path);
        }

        log::debug!(
            "Scanned {}: {} entries ({} hidden), newest modified at {}",
            self.target_dir.display(),
            self.scanned_names.len(),
            hidden,
            self.scanned_max_modified
        );
        Ok(())
    }

    /// Read the cache file into items, then rebuild if they are stale
    ///
    /// Never fails: an absent or corrupt cache reads as empty, which forces a rebuild.
    pub fn load(&mut self) {
        self.was_rebuilt = false;
        self.items = self.read_cache_file();
        self.cache_file_modified = self.lister.last_modified(&self.cache_file_path);

        match self.staleness() {
            Some(reason) => {
                log::info!("Cache for {} is stale ({}), rebuilding", self.target_dir.display(), reason);
                self.rebuild();
                self.was_rebuilt = true;
            }
            None => {
                log::debug!("Loaded {} cached items from {}", self.items.len(), self.cache_file_path.display());
            }
        }
    }

    /// First reason the loaded items do not match the last scan, if any
    pub fn staleness(&self) -> Option<Staleness> {
        if self.scanned_max_modified > self.cache_file_modified {
            return Some(Staleness::EntryModified {
                entry_nanos: self.scanned_max_modified,
                cache_nanos: self.cache_file_modified,
            });
        }
        if self.items.is_empty() {
            return Some(Staleness::Empty);
        }
        if self.scanned_names.len() + SYNTHETIC_ITEM_COUNT != self.items.len() {
            return Some(Staleness::CountMismatch {
                scanned: self.scanned_names.len(),
                cached: self.items.len() - SYNTHETIC_ITEM_COUNT,
            });
        }

        self.scanned_names
            .iter()
            .zip(&self.items[SYNTHETIC_ITEM_COUNT..])
            .position(|(scanned, item)| scanned != item.name())
            .map(|position| Staleness::NameMismatch {
                position,
                scanned: self.scanned_names[position].clone(),
                cached: self.items[position + SYNTHETIC_ITEM_COUNT].name().to_string(),
            })
    }

    pub fn is_stale(&self) -> bool {
        self.staleness().is_some()
    }

    /// Render every scanned entry again and persist the result
    ///
    /// Entries whose thumbnail fails are left out. The synthetic folder item is always
    /// present and falls back to a blank thumbnail.
    pub fn rebuild(&mut self) -> RebuildReport {
        self.items.clear();
        let mut report = RebuildReport::default();

        let folder_bitmap = self.render_bitmap(&self.target_dir).unwrap_or_else(|e| {
            log::warn!("{e}");
            BitmapRecord::blank()
        });
        let folder_item = CacheItem::with_sanitized_name(self.folder_item_name(), folder_bitmap);
        self.items.push(folder_item);

        // render from the listed path, the name may be a lossy rendition of it
        for (name, path) in self.scanned_names.iter().zip(&self.scanned_paths) {
            match self.render_bitmap(path).and_then(|bitmap| CacheItem::new(name.as_str(), bitmap)) {
                Ok(item) => self.items.push(item),
                Err(e) => {
                    log::warn!("Leaving {} out of the cache: {}", name, e);
                    report.skipped.push(name.clone());
                }
            }
        }
        report.item_count = self.items.len();

        if let Err(e) = self.persist() {
            log::warn!("{e}; the cache will be rebuilt on the next run");
            report.persist_error = Some(e.to_string());
        }

        log::info!(
            "Rebuilt cache for {}: {} items, {} skipped",
            self.target_dir.display(),
            report.item_count,
            report.skipped.len()
        );
        self.last_rebuild = Some(report.clone());
        report
    }

    /// Replace the cache file with the serialized items
    ///
    /// The old file is deleted first and the new one is hidden from directory listings.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::PersistFailure`] if the file cannot be removed or written.
    pub fn persist(&mut self) -> Result<()> {
        let mut buffer = serialize_items(&self.items);
        let path = &self.cache_file_path;

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(CacheError::PersistFailure { path: path.clone(), source }),
        }

        buffer.save_to_file(path)?;
        if let Err(e) = mark_hidden(path) {
            log::warn!("Could not hide cache file {}: {}", path.display(), e);
        }
        log::debug!("Wrote {} bytes to {}", buffer.size(), path.display());
        buffer.release();

        self.cache_file_modified = self.lister.last_modified(path);
        Ok(())
    }

    pub fn items(&self) -> &[CacheItem] {
        &self.items
    }

    /// Items that correspond to directory children
    pub fn child_items(&self) -> &[CacheItem] {
        self.items.get(SYNTHETIC_ITEM_COUNT..).unwrap_or(&[])
    }

    pub fn fixed_item_count(&self) -> usize {
        SYNTHETIC_ITEM_COUNT
    }

    /// True once [`CacheIndex::load`] had to rebuild
    pub fn was_rebuilt(&self) -> bool {
        self.was_rebuilt
    }

    pub fn last_rebuild(&self) -> Option<&RebuildReport> {
        self.last_rebuild.as_ref()
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn cache_file_path(&self) -> &Path {
        &self.cache_file_path
    }

    pub fn scanned_names(&self) -> &[String] {
        &self.scanned_names
    }

    /// Newest entry modification time from the last scan, in epoch nanoseconds
    pub fn scanned_max_modified(&self) -> i64 {
        self.scanned_max_modified
    }

    /// Cache file modification time in epoch nanoseconds, 0 when there is no file
    pub fn cache_file_modified(&self) -> i64 {
        self.cache_file_modified
    }

    /// Path item `index` stands for: the target directory for item 0, a child otherwise
    pub fn item_path(&self, index: usize) -> Option<PathBuf> {
        if index < SYNTHETIC_ITEM_COUNT {
            return Some(self.target_dir.clone());
        }
        let item = self.items.get(index)?;
        let position = index - SYNTHETIC_ITEM_COUNT;
        match (self.scanned_names.get(position), self.scanned_paths.get(position)) {
            (Some(name), Some(path)) if name == item.name() => Some(path.clone()),
            _ => Some(self.target_dir.join(item.name())),
        }
    }

    fn folder_item_name(&self) -> String {
        format!("{}{}", self.open_label, self.target_dir.display())
    }

    fn render_bitmap(&self, path: &Path) -> Result<BitmapRecord> {
        let icon = self.renderer.render(path)?;
        BitmapRecord::from_pixels(&icon.pixels, icon.width, icon.height)
            .map_err(|e| CacheError::render_failure(path, e))
    }

    fn read_cache_file(&self) -> Vec<CacheItem> {
        let mut buffer = ByteBuffer::new();
        match buffer.load_from_file(&self.cache_file_path) {
            Ok(_) => {}
            Err(e) if e.is_recoverable_cache_error() => {
                log::debug!("No usable cache file: {}", e);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Ignoring unreadable cache file {}: {}", self.cache_file_path.display(), e);
                return Vec::new();
            }
        }

        match parse_items(buffer.as_slice()) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Discarding malformed cache file {}: {}", self.cache_file_path.display(), e);
                Vec::new()
            }
        }
    }
}
