use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::indexer::CacheIndex;
use crate::utils::trim_suffix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRow {
    /// Selectable row; `selection` is the cache item index it stands for
    Item { selection: usize, label: String },
    /// Disabled informational row
    Notice(String),
    Separator,
}

/// Popup menu layout for one loaded [`CacheIndex`]
///
/// Rows are: the "open this folder" item, a notice if the cache was just rebuilt, a
/// separator, then one row per directory child. `fixed_items` counts the rows before the
/// separator, so child item `i` sits at row `i + fixed_items`.
#[derive(Debug, Clone)]
pub struct Menu {
    rows: Vec<MenuRow>,
    fixed_items: usize,
    paths: Vec<PathBuf>,
}

impl Menu {
    pub fn build(index: &CacheIndex, settings: &Settings) -> Self {
        let items = index.items();
        let mut rows = Vec::with_capacity(items.len() + 2);
        let mut fixed_items = index.fixed_item_count();

        let label = |name: &str| trim_suffix(name, &settings.strip_suffix).to_string();

        if let Some(folder) = items.first() {
            rows.push(MenuRow::Item { selection: 0, label: label(folder.name()) });
        }
        if index.was_rebuilt() {
            rows.push(MenuRow::Notice(settings.rebuilt_notice.clone()));
            fixed_items += 1;
        }
        rows.push(MenuRow::Separator);

        for (i, item) in items.iter().enumerate().skip(index.fixed_item_count()) {
            rows.push(MenuRow::Item { selection: i, label: label(item.name()) });
        }

        let paths = (0..items.len()).filter_map(|i| index.item_path(i)).collect();

        Self { rows, fixed_items, paths }
    }

    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    pub fn fixed_items(&self) -> usize {
        self.fixed_items
    }

    /// Cache item index shown at `row`, if that row is selectable
    pub fn item_at_row(&self, row: usize) -> Option<usize> {
        match self.rows.get(row)? {
            MenuRow::Item { selection, .. } => Some(*selection),
            _ => None,
        }
    }

    /// Path a selection opens: the target directory for 0, a child otherwise
    pub fn resolve(&self, selection: usize) -> Option<&Path> {
        self.paths.get(selection).map(PathBuf::as_path)
    }
}
