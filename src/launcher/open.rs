use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Hand `path` to the platform opener without waiting for it
pub fn launch(path: &Path) -> Result<()> {
    log::debug!("Launching {} with {}", path.display(), OPENER);
    Command::new(OPENER)
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch {} with {}", path.display(), OPENER))?;
    Ok(())
}
