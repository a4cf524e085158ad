/// End-to-end tests of the cache lifecycle against a real directory
mod common;

use std::fs;
use std::time::{Duration, UNIX_EPOCH};

use common::{CountingRenderer, StackDirBuilder, touch_forward};
use stacky::{CacheIndex, FsDirectoryLister, Settings, Staleness};

fn open(dir: &std::path::Path, renderer: &CountingRenderer) -> CacheIndex {
    let mut index = CacheIndex::new(dir, &Settings::default()).with_renderer(renderer.clone());
    index.refresh().expect("refresh should succeed");
    index
}

fn sorted_children(index: &CacheIndex) -> Vec<String> {
    let mut names: Vec<String> = index.child_items().iter().map(|i| i.name().to_string()).collect();
    names.sort();
    names
}

#[test]
fn test_three_run_scenario() {
    let stack = StackDirBuilder::new().with_file("a.lnk").with_file("b.lnk").build();

    // First run: no cache yet
    let renderer = CountingRenderer::new();
    let first = open(stack.path(), &renderer);
    assert!(first.was_rebuilt());
    assert_eq!(first.items().len(), 3);
    assert_eq!(sorted_children(&first), vec!["a.lnk", "b.lnk"]);
    assert_eq!(renderer.call_count(), 3);
    assert!(first.cache_file_path().exists());

    // Second run: nothing changed
    let renderer = CountingRenderer::new();
    let second = open(stack.path(), &renderer);
    assert!(!second.was_rebuilt());
    assert_eq!(renderer.call_count(), 0);
    assert_eq!(second.items(), first.items());

    // Third run: a.lnk removed
    fs::remove_file(stack.path().join("a.lnk")).unwrap();
    let renderer = CountingRenderer::new();
    let third = open(stack.path(), &renderer);
    assert!(third.was_rebuilt());
    assert_eq!(third.items().len(), 2);
    assert_eq!(sorted_children(&third), vec!["b.lnk"]);
}

#[test]
fn test_cache_file_never_appears_in_scan() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    open(stack.path(), &CountingRenderer::new());

    let mut index = CacheIndex::new(stack.path(), &Settings::default());
    index.scan().unwrap();

    assert_eq!(index.scanned_names(), &["a.lnk"]);
}

#[test]
#[cfg(unix)]
fn test_cache_file_is_hidden_from_listing() {
    use stacky::DirectoryLister;

    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    let index = open(stack.path(), &CountingRenderer::new());

    let entries = FsDirectoryLister.enumerate(stack.path()).unwrap();
    let cache_entry = entries
        .iter()
        .find(|e| e.path == index.cache_file_path())
        .expect("cache file should be listed by the raw lister");
    assert!(cache_entry.is_hidden);
}

#[test]
fn test_touched_entry_forces_rebuild() {
    let stack = StackDirBuilder::new().with_file("a.lnk").with_file("b.lnk").build();
    open(stack.path(), &CountingRenderer::new());

    touch_forward(&stack.path().join("b.lnk"), 60);

    let renderer = CountingRenderer::new();
    let index = open(stack.path(), &renderer);
    assert!(index.was_rebuilt());
    assert_eq!(renderer.call_count(), 3);
}

#[test]
fn test_entry_newer_within_same_second_forces_rebuild() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    let first = open(stack.path(), &CountingRenderer::new());

    let base = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    common::set_mtime(first.cache_file_path(), base + Duration::from_millis(100));
    common::set_mtime(&stack.path().join("a.lnk"), base + Duration::from_millis(900));

    let renderer = CountingRenderer::new();
    let index = open(stack.path(), &renderer);
    assert!(index.was_rebuilt());
    assert_eq!(renderer.call_count(), 2);
}

#[test]
fn test_entry_older_within_same_second_is_fresh() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    let first = open(stack.path(), &CountingRenderer::new());

    let base = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    common::set_mtime(&stack.path().join("a.lnk"), base + Duration::from_millis(100));
    common::set_mtime(first.cache_file_path(), base + Duration::from_millis(900));

    let index = open(stack.path(), &CountingRenderer::new());
    assert!(!index.was_rebuilt());
}

#[test]
#[cfg(unix)]
fn test_dangling_symlink_settles_after_one_rebuild() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    std::os::unix::fs::symlink(stack.path().join("removed-target"), stack.path().join("link.lnk")).unwrap();

    let mut first = CacheIndex::new(stack.path(), &Settings::default());
    first.refresh().unwrap();
    assert!(first.was_rebuilt());
    assert_eq!(first.child_items().len(), 2);
    assert!(first.last_rebuild().unwrap().skipped.is_empty());

    for _ in 0..2 {
        let mut index = CacheIndex::new(stack.path(), &Settings::default());
        index.refresh().unwrap();
        assert!(!index.was_rebuilt());
        assert_eq!(index.child_items().len(), 2);
    }
}

#[test]
#[cfg(target_os = "linux")]
fn test_non_utf8_name_settles_after_one_rebuild() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let stack = StackDirBuilder::new().build();
    let raw = stack.path().join(OsStr::from_bytes(b"caf\xe9.lnk"));
    fs::write(&raw, b"x").unwrap();

    let mut first = CacheIndex::new(stack.path(), &Settings::default());
    first.refresh().unwrap();
    assert_eq!(first.child_items().len(), 1);
    assert_eq!(first.item_path(1), Some(raw));

    let mut second = CacheIndex::new(stack.path(), &Settings::default());
    second.refresh().unwrap();
    assert!(!second.was_rebuilt());
}

#[test]
fn test_added_entry_forces_rebuild() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    open(stack.path(), &CountingRenderer::new());

    fs::write(stack.path().join("c.lnk"), b"c").unwrap();
    // keep the new file older than the cache so only the name set differs
    let cache_mtime = fs::metadata(stack.path().join(".stacky.cache")).unwrap().modified().unwrap();
    common::set_mtime(&stack.path().join("c.lnk"), cache_mtime - std::time::Duration::from_secs(60));

    let mut index = CacheIndex::new(stack.path(), &Settings::default());
    index.scan().unwrap();
    index.load();
    assert!(index.was_rebuilt());
    assert_eq!(index.child_items().len(), 2);
}

#[test]
fn test_hidden_entries_are_ignored() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    #[cfg(unix)]
    fs::write(stack.path().join(".DS_Store"), b"x").unwrap();

    let index = open(stack.path(), &CountingRenderer::new());
    assert_eq!(sorted_children(&index), vec!["a.lnk"]);
}

#[test]
fn test_subdirectories_are_entries() {
    let stack = StackDirBuilder::new().with_file("a.lnk").with_dir("Projects").build();
    let index = open(stack.path(), &CountingRenderer::new());

    assert_eq!(sorted_children(&index), vec!["Projects", "a.lnk"]);
}

#[test]
fn test_truncated_cache_is_rebuilt() {
    let stack = StackDirBuilder::new().with_file("a.lnk").with_file("b.lnk").build();
    let first = open(stack.path(), &CountingRenderer::new());

    let cache_path = first.cache_file_path().to_path_buf();
    let bytes = fs::read(&cache_path).unwrap();
    fs::write(&cache_path, &bytes[..bytes.len() - 7]).unwrap();

    let renderer = CountingRenderer::new();
    let index = open(stack.path(), &renderer);
    assert!(index.was_rebuilt());
    assert_eq!(index.items().len(), 3);
    assert_eq!(fs::read(&cache_path).unwrap().len(), bytes.len());
}

#[test]
fn test_degraded_rebuild_skips_failed_entry() {
    let stack = StackDirBuilder::new().with_file("a.lnk").with_file("b.lnk").with_file("c.lnk").build();

    let renderer = CountingRenderer::new().failing_on("b.lnk");
    let index = open(stack.path(), &renderer);

    assert_eq!(index.items().len(), 3);
    assert_eq!(sorted_children(&index), vec!["a.lnk", "c.lnk"]);
    let report = index.last_rebuild().unwrap();
    assert_eq!(report.skipped, vec!["b.lnk"]);
    assert!(report.persisted());
    assert!(index.cache_file_path().exists());

    // the degraded cache is one entry short, so the next run tries again
    let mut retry = CacheIndex::new(stack.path(), &Settings::default()).with_renderer(CountingRenderer::new());
    retry.scan().unwrap();
    retry.load();
    assert!(retry.was_rebuilt());
    assert_eq!(retry.child_items().len(), 3);
}

#[test]
fn test_missing_directory_is_fatal() {
    let stack = StackDirBuilder::new().build();
    let mut index = CacheIndex::new(stack.path().join("missing"), &Settings::default());

    let err = index.refresh().unwrap_err();
    assert!(matches!(err, stacky::CacheError::DirectoryUnreadable { .. }));
}

#[test]
fn test_fresh_cache_reports_no_staleness() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    open(stack.path(), &CountingRenderer::new());

    let index = open(stack.path(), &CountingRenderer::new());
    assert_eq!(index.staleness(), None::<Staleness>);
}

#[test]
fn test_custom_cache_file_name() {
    let stack = StackDirBuilder::new().with_file("a.lnk").build();
    let settings = Settings { cache_file_name: ".thumbs".to_string(), ..Settings::default() };

    let mut index = CacheIndex::new(stack.path(), &settings).with_renderer(CountingRenderer::new());
    index.refresh().unwrap();

    assert!(stack.path().join(".thumbs").exists());
    assert!(!stack.path().join(".stacky.cache").exists());
}
