//! Tracing initialization.
//! Builds a subscriber with an EnvFilter, compact or JSON formatting, and an
//! optional non-blocking file layer.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - File logging is refused if any ancestor of the file path is a symlink;
//!   the sync still runs, logging to stdout only.

use anyhow::Result;
use chrono::Local;
use std::fmt as stdfmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

use tree_sync::output as out;
use tree_sync::{LogLevel, default_log_path, path_has_symlink_ancestor};

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> stdfmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

/// Open for append; new files get 0600 on Unix.
fn open_log_file_append(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}

/// Try to open a non-blocking file writer for logging. Prints the reason and
/// returns None when the path is unsafe or cannot be opened.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(true) => {
            eprintln!(
                "Refusing to enable file logging: ancestor of {} is a symlink; proceeding without file logging.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!(
                "Error checking log path {} for symlinks: {}; proceeding without file logging.",
                path.display(),
                e
            );
            return None;
        }
        Ok(false) => {}
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match open_log_file_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialize tracing. Returns the WorkerGuard of the file appender, if any;
/// it must be held until shutdown so buffered lines get flushed.
pub fn init_tracing(lvl: LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::default().add_directive(to_level_filter(lvl).into());

    let file = match log_file {
        Some(path) => {
            let opened = maybe_open_non_blocking_writer(path);
            if opened.is_none() {
                out::print_warn(&format!(
                    "Requested file logging to '{}' was not enabled. Check that the parent directory is writable and that no ancestor is a symlink. Logs will continue to stdout.",
                    path.display()
                ));
                if let Some(def) = default_log_path() {
                    out::print_info(&format!("You can try the default log path instead: {}", def.display()));
                }
            }
            opened
        }
        None => None,
    };

    let (file_writer, guard) = match file {
        Some((w, g)) => (Some(w), Some(g)),
        None => (None, None),
    };

    if json {
        let stdout_layer = tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(true);
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .event_format(tsfmt::format().json())
                .with_timer(LocalHumanTime)
                .with_level(true)
                .with_target(true)
                .with_writer(w)
        });
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()?;
    } else {
        let stdout_layer = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_level(true)
            .with_target(false)
            .compact();
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .with_timer(LocalHumanTime)
                .with_level(true)
                .with_target(true)
                .with_ansi(false)
                .compact()
                .with_writer(w)
        });
        registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()?;
    }

    Ok(guard)
}
