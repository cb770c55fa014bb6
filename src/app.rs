//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates the roots and runs the sync.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use tree_sync::cli::Args;
use tree_sync::config::{
    CONFIG_ENV, Config, create_template_config, default_config_path, load_config,
    validate_and_normalize,
};
use tree_sync::output as out;
use tree_sync::{SyncError, shutdown, sync};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config / --init-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = default_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine a default config path"))?;
        create_template_config(&path)?;
        out::print_success(&format!("A template tree_sync config was written to: {}", path.display()));
        return Ok(());
    }

    // Defaults < XML < CLI
    let mut cfg = match load_config()? {
        Some((_, cfg)) => cfg,
        None => Config::default(),
    };
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard is dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping after the current operation...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })?;
    }

    debug!("Starting tree_sync: {:?}", args);

    let result = (|| -> Result<()> {
        if let Err(e) = validate_and_normalize(&mut cfg) {
            if let Some(se) = e.downcast_ref::<SyncError>() {
                error!(code = se.code(), kind = se.kind(), error = %se, "Invalid configuration");
            } else {
                error!(error = %e, "Invalid configuration");
            }
            return Err(e);
        }

        match sync(&cfg) {
            Ok(report) => {
                if cfg.dry_run {
                    out::print_plan(&report.plan);
                }
                let line = out::summary_line(&report, cfg.dry_run);
                info!(
                    copied = report.summary.copied,
                    moved = report.summary.moved,
                    deleted = report.summary.deleted,
                    bytes = report.summary.bytes_copied,
                    "Sync completed"
                );
                out::print_success(&line);
                Ok(())
            }
            Err(e) => {
                match &e {
                    SyncError::Io { op, path, source } => {
                        error!(code = e.code(), kind = e.kind(), op, path = %path.display(), error = %source, "Sync failed")
                    }
                    SyncError::Walk { root, source } => {
                        error!(code = e.code(), kind = e.kind(), root = %root.display(), error = %source, "Sync failed")
                    }
                    SyncError::InvalidRoot { path, reason } => {
                        error!(code = e.code(), kind = e.kind(), path = %path.display(), %reason, "Sync failed")
                    }
                    SyncError::Interrupted => {
                        error!(code = e.code(), kind = e.kind(), "Sync aborted by user")
                    }
                }
                Err(e.into())
            }
        }
    })();

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {} (explicit):\n  {}\n", CONFIG_ENV, cfg_env));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default tree_sync config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}
