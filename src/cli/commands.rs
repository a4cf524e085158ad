use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::config::Settings;
use crate::indexer::CacheIndex;
use crate::launcher::{Menu, MenuRow, launch};
use crate::utils::terminal::sanitize_label;
use crate::utils::{format_path_with_tilde, normalize_target_dir, validate_target_dir};

#[derive(Parser)]
#[command(name = "stacky")]
#[command(version = "0.1.0")]
#[command(about = "Popup launcher for a folder, backed by a thumbnail cache", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Settings file (defaults to $STACKY_CONFIG, then the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the launcher menu for a folder, rebuilding its cache if stale
    List {
        /// Stack folder
        dir: String,
    },
    /// Rebuild a folder's cache unconditionally
    Rebuild {
        /// Stack folder
        dir: String,
    },
    /// Print the path a menu selection opens
    Resolve {
        /// Stack folder
        dir: String,
        /// Selection number shown by `list`
        selection: usize,
    },
    /// Open a menu selection with the system opener
    Open {
        /// Stack folder
        dir: String,
        /// Selection number shown by `list`
        selection: usize,
    },
    /// Show statistics about a folder's cache
    Stats {
        /// Stack folder
        dir: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Some(Commands::List { dir }) => show_menu(dir, &settings)?,
        Some(Commands::Rebuild { dir }) => rebuild(dir, &settings)?,
        Some(Commands::Resolve { dir, selection }) => {
            let path = resolve_selection(dir, *selection, &settings)?;
            println!("{}", path.display());
        }
        Some(Commands::Open { dir, selection }) => {
            let path = resolve_selection(dir, *selection, &settings)?;
            launch(&path)?;
        }
        Some(Commands::Stats { dir }) => show_stats(dir, &settings)?,
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// `RUST_LOG` overrides the level picked by `--debug`
fn init_logging(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = env_logger::Builder::new().filter_level(level).parse_default_env().try_init();
}

fn target_dir(dir: &str) -> Result<PathBuf> {
    let path = normalize_target_dir(dir);
    validate_target_dir(&path)?;
    Ok(path)
}

fn open_index(dir: &str, settings: &Settings) -> Result<CacheIndex> {
    let path = target_dir(dir)?;
    let mut index = CacheIndex::new(&path, settings);
    index.refresh().with_context(|| format!("Invalid path: {}", path.display()))?;
    Ok(index)
}

fn show_menu(dir: &str, settings: &Settings) -> Result<()> {
    let index = open_index(dir, settings)?;
    let menu = Menu::build(&index, settings);

    for row in menu.rows() {
        match row {
            MenuRow::Item { selection, label } => println!("{:>3}  {}", selection, sanitize_label(label)),
            MenuRow::Notice(text) => println!("     ({})", text),
            MenuRow::Separator => println!("     ----"),
        }
    }

    warn_if_degraded(&index);
    Ok(())
}

fn rebuild(dir: &str, settings: &Settings) -> Result<()> {
    let path = target_dir(dir)?;
    let mut index = CacheIndex::new(&path, settings);
    index.scan().with_context(|| format!("Invalid path: {}", path.display()))?;
    let report = index.rebuild();

    println!(
        "Rebuilt {}: {} items ({} skipped)",
        format_path_with_tilde(index.target_dir()),
        report.item_count,
        report.skipped.len()
    );
    warn_if_degraded(&index);
    Ok(())
}

fn resolve_selection(dir: &str, selection: usize, settings: &Settings) -> Result<PathBuf> {
    let index = open_index(dir, settings)?;
    let menu = Menu::build(&index, settings);

    match menu.resolve(selection) {
        Some(path) => Ok(path.to_path_buf()),
        None => bail!(
            "Selection {} is out of range (0-{} available)",
            selection,
            index.items().len().saturating_sub(1)
        ),
    }
}

fn show_stats(dir: &str, settings: &Settings) -> Result<()> {
    let index = open_index(dir, settings)?;

    println!("Stack Cache Statistics");
    println!("======================");
    println!("Folder: {}", format_path_with_tilde(index.target_dir()));
    println!("Cache file: {}", format_path_with_tilde(index.cache_file_path()));
    println!("Total items: {}", index.items().len());
    println!("  Entries: {}", index.child_items().len());
    println!("Rebuilt this run: {}", if index.was_rebuilt() { "yes" } else { "no" });

    if index.cache_file_modified() != 0 {
        let written = DateTime::from_timestamp_nanos(index.cache_file_modified());
        println!("Cache written: {}", written.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    }
    if index.scanned_max_modified() != 0 {
        let newest = DateTime::from_timestamp_nanos(index.scanned_max_modified());
        println!("Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    }

    Ok(())
}

fn warn_if_degraded(index: &CacheIndex) {
    let Some(report) = index.last_rebuild() else {
        return;
    };
    for name in &report.skipped {
        eprintln!("Warning: no thumbnail for {}, left out of the cache", sanitize_label(name));
    }
    if let Some(e) = &report.persist_error {
        eprintln!("Warning: {}", e);
    }
}
