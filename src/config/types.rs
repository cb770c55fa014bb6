//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// One line per operation (default)
    #[default]
    Normal,
    /// Planning details
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tree whose content is authoritative
    pub source_root: PathBuf,
    /// Tree that is made to match the source
    pub dest_root: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, log the plan but do not modify the destination
    pub dry_run: bool,
    /// Digest files on a thread pool
    pub parallel_hashing: bool,
    /// Remove directories left empty by moves and deletes
    pub prune_empty_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            dest_root: PathBuf::new(),
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            parallel_hashing: true,
            prune_empty_dirs: true,
        }
    }
}

impl Config {
    /// Construct a Config with explicit roots; other fields use defaults.
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            ..Default::default()
        }
    }
}
