//! Config validation logic.
//! Verifies both roots exist, are readable (destination also writable),
//! canonicalizes them and makes sure neither contains the other.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::types::Config;
use crate::errors::SyncError;

/// Validate `cfg` and replace both roots with their canonical form.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    ensure_dir(&cfg.source_root, "source")?;
    ensure_dir(&cfg.dest_root, "destination")?;
    ensure_readable(&cfg.source_root, "source")?;
    ensure_readable(&cfg.dest_root, "destination")?;
    ensure_writable(&cfg.dest_root, "destination")?;

    let src = dunce::canonicalize(&cfg.source_root)
        .with_context(|| format!("canonicalize source '{}'", cfg.source_root.display()))?;
    let dst = dunce::canonicalize(&cfg.dest_root)
        .with_context(|| format!("canonicalize destination '{}'", cfg.dest_root.display()))?;

    if src == dst {
        return Err(invalid(&dst, "source and destination resolve to the same path").into());
    }
    if dst.starts_with(&src) {
        return Err(invalid(&dst, format!("destination must not be inside source '{}'", src.display())).into());
    }
    if src.starts_with(&dst) {
        return Err(invalid(&src, format!("source must not be inside destination '{}'", dst.display())).into());
    }

    info!(source = %src.display(), destination = %dst.display(), "Config validated");
    cfg.source_root = src;
    cfg.dest_root = dst;
    Ok(())
}

fn invalid(path: &Path, reason: impl Into<String>) -> SyncError {
    SyncError::InvalidRoot {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Path must be set, exist and be a directory.
fn ensure_dir(path: &Path, name: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(path, format!("no {name} directory given")).into());
    }
    if !path.exists() {
        return Err(invalid(path, format!("{name} does not exist")).into());
    }
    if !path.is_dir() {
        return Err(invalid(path, format!("{name} is not a directory")).into());
    }
    Ok(())
}

fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path).with_context(|| {
        format!("Cannot read {name} directory '{}'; check permissions", path.display())
    })?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

/// Non-destructive probe: create and remove a uniquely named file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".tree_sync_probe_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
        .with_context(|| {
            format!("Cannot write to {name} '{}'; check permissions", path.display())
        })?;
    if let Err(e) = fs::remove_file(&probe) {
        debug!(
            "Could not remove write probe {}: {}; the next sync will delete it",
            probe.display(),
            e
        );
    }
    debug!("{name} writable: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_probe_is_cleaned_up() {
        let td = tempfile::tempdir().unwrap();
        ensure_writable(td.path(), "destination").unwrap();
        assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
    }
}
