use std::borrow::Cow;
use std::env;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use anyhow::{Result, bail};

/// Normalizes a target directory argument
///
/// Strips surrounding double quotes and trailing separators, keeping a bare root intact.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use stacky::utils::normalize_target_dir;
///
/// assert_eq!(normalize_target_dir("\"/home/me/stack/\""), PathBuf::from("/home/me/stack"));
/// ```
pub fn normalize_target_dir(arg: &str) -> PathBuf {
    let unquoted = arg.trim().trim_matches('"');
    let trimmed = unquoted.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !unquoted.is_empty() {
        return PathBuf::from(MAIN_SEPARATOR.to_string());
    }
    // "C:" alone would mean "current directory on C:", keep its separator
    if trimmed.len() == 2 && trimmed.ends_with(':') && unquoted.len() > 2 {
        return PathBuf::from(format!("{trimmed}{MAIN_SEPARATOR}"));
    }
    PathBuf::from(trimmed)
}

/// Checks that a normalized target names an existing directory
///
/// # Errors
///
/// Returns an error if the path is empty or does not name a directory.
pub fn validate_target_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("Path to the stack folder is missing. Example: stacky list ~/Stacks/Projects");
    }
    if !path.is_dir() {
        bail!("Path: {} is not a valid directory", path.display());
    }
    Ok(())
}

/// Removes `suffix` from the end of `name` when present
///
/// # Examples
///
/// ```
/// use stacky::utils::trim_suffix;
///
/// assert_eq!(trim_suffix("Editor.lnk", ".lnk"), "Editor");
/// assert_eq!(trim_suffix("notes.txt", ".lnk"), "notes.txt");
/// ```
pub fn trim_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return name;
    }
    name.strip_suffix(suffix).unwrap_or(name)
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
