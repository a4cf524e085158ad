//! Directory listing seam and its file system implementation

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::error::{CacheError, Result};
use crate::models::DirEntryInfo;

/// Lists the direct children of a directory and reports modification times
pub trait DirectoryLister {
    /// Children of `dir` in enumeration order, `.`/`..` excluded
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::DirectoryUnreadable`] if `dir` cannot be opened.
    fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntryInfo>>;

    /// Last modification time of `path` in nanoseconds since the Unix epoch, or 0 if it
    /// does not exist
    fn last_modified(&self, path: &Path) -> i64;
}

/// Lists the real file system, one level deep, in the order the OS returns entries
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    fn enumerate(&self, dir: &Path) -> Result<Vec<DirEntryInfo>> {
        let unreadable = |source: io::Error| CacheError::DirectoryUnreadable { path: dir.to_path_buf(), source };

        let metadata = fs::metadata(dir).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(unreadable(io::Error::new(io::ErrorKind::NotADirectory, "not a directory")));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(unreadable(io::Error::from(e))),
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_hidden = match entry.metadata() {
                Ok(meta) => is_hidden(&name, &meta),
                Err(_) => is_hidden_name(&name),
            };
            let path = entry.into_path();
            let modified_nanos = self.last_modified(&path);

            entries.push(DirEntryInfo { name, path, is_hidden, modified_nanos });
        }

        Ok(entries)
    }

    fn last_modified(&self, path: &Path) -> i64 {
        fs::metadata(path).and_then(|m| m.modified()).map(to_epoch_nanos).unwrap_or(0)
    }
}

/// Full-precision timestamp; saturates outside the years 1677..=2262
fn to_epoch_nanos(time: SystemTime) -> i64 {
    let time = DateTime::<Utc>::from(time);
    let saturated = if time.timestamp() < 0 { i64::MIN } else { i64::MAX };
    time.timestamp_nanos_opt().unwrap_or(saturated)
}

fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(windows)]
fn is_hidden(_name: &str, metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    use windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_HIDDEN;

    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _metadata: &Metadata) -> bool {
    is_hidden_name(name)
}

/// Hide `path` from directory listings
///
/// On Windows this sets the hidden and system attributes. Elsewhere hiding is by name, so the
/// cache file name is expected to start with a dot and this is a no-op.
#[cfg(windows)]
pub fn mark_hidden(path: &Path) -> io::Result<()> {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{
        FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM, SetFileAttributesW,
    };

    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
    // SAFETY: `wide` is null-terminated and outlives the call
    let ok = unsafe { SetFileAttributesW(wide.as_ptr(), FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) };
    if ok == 0 { Err(io::Error::last_os_error()) } else { Ok(()) }
}

#[cfg(not(windows))]
pub fn mark_hidden(path: &Path) -> io::Result<()> {
    if path.file_name().is_some_and(|n| !is_hidden_name(&n.to_string_lossy())) {
        log::debug!("{} is not dot-prefixed and stays visible", path.display());
    }
    Ok(())
}
