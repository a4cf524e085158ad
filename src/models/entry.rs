use std::path::PathBuf;

/// A direct child of the target directory as reported by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_hidden: bool,
    /// Nanoseconds since the Unix epoch
    pub modified_nanos: i64,
}

/// Pixels produced by an icon renderer: 32-bit BGRA, `width * |height| * 4` bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedIcon {
    pub pixels: Vec<u8>,
    pub width: i32,
    pub height: i32,
}
