//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use stacky::error::{CacheError, Result};
use stacky::{IconRenderer, RenderedIcon};
use tempfile::TempDir;

/// Builder for stack folders on disk
pub struct StackDirBuilder {
    temp_dir: TempDir,
}

impl StackDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Add a shortcut-like file with the given name
    pub fn with_file(self, name: &str) -> Self {
        fs::write(self.temp_dir.path().join(name), name.as_bytes()).expect("Failed to write file");
        self
    }

    pub fn with_dir(self, name: &str) -> Self {
        fs::create_dir(self.temp_dir.path().join(name)).expect("Failed to create dir");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for StackDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Set the modification time of `path` to `secs` after its current value
pub fn touch_forward(path: &Path, secs: u64) {
    let current = fs::metadata(path).and_then(|m| m.modified()).expect("Failed to read mtime");
    set_mtime(path, current + Duration::from_secs(secs));
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .expect("Failed to set mtime");
}

/// Renderer that counts calls and fails for chosen file names
#[derive(Clone, Default)]
pub struct CountingRenderer {
    pub calls: Rc<Cell<usize>>,
    failing: HashSet<String>,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.get()
    }
}

impl IconRenderer for CountingRenderer {
    fn render(&self, path: &Path) -> Result<RenderedIcon> {
        self.calls.set(self.calls.get() + 1);

        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if self.failing.contains(&name) {
            return Err(CacheError::render_failure(path, "icon unavailable"));
        }

        let shade = name.len() as u8;
        Ok(RenderedIcon { pixels: vec![shade; 2 * 2 * 4], width: 2, height: -2 })
    }
}
