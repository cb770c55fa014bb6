//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - SOURCE and DEST override the <source>/<destination> config values.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Make DEST a content-identical copy of SOURCE, renaming files that already
/// exist under another name instead of copying them again.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Mirror a directory tree, preferring renames over copies (Rust)"
)]
pub struct Args {
    /// Source tree (authoritative content).
    #[arg(value_name = "SOURCE", value_hint = ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Destination tree (made to match SOURCE).
    #[arg(value_name = "DEST", value_hint = ValueHint::DirPath)]
    pub dest: Option<PathBuf>,

    /// Print the plan and what it would do, change nothing.
    #[arg(long, help = "Show what would be done, but do not modify the destination")]
    pub dry_run: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    /// Also append logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Append logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Hash files one at a time instead of on all cores.
    #[arg(long, help = "Hash files sequentially")]
    pub sequential: bool,

    /// Leave directories that the sync empties in place.
    #[arg(long, help = "Do not remove directories emptied by the sync")]
    pub keep_empty_dirs: bool,

    /// Print where tree_sync will look for the config file, then exit.
    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    /// Write a template config at the default location, then exit.
    #[arg(long, help = "Create a template config file and exit")]
    pub init_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(src) = &self.source {
            cfg.source_root = src.clone();
        }
        if let Some(dst) = &self.dest {
            cfg.dest_root = dst.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.sequential {
            cfg.parallel_hashing = false;
        }
        if self.keep_empty_dirs {
            cfg.prune_empty_dirs = false;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
