//! Plan executor.
//! Applies operations strictly in order and stops at the first failure; whatever
//! completed before the failure stays applied.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::atomic::try_atomic_move;
use super::copy::safe_copy_and_rename;
use super::util::{is_cross_device, prune_empty_parents};
use crate::errors::SyncError;
use crate::plan::{Operation, Plan};
use crate::shutdown;

/// Executor behaviour switches.
#[derive(Debug, Clone, Copy)]
pub struct ExecOptions {
    /// Log every operation, touch nothing.
    pub dry_run: bool,
    /// Remove directories emptied by moves/deletes (never the root).
    pub prune_empty_dirs: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            prune_empty_dirs: true,
        }
    }
}

/// What a run did (or, for a dry run, would do).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    pub copied: usize,
    pub moved: usize,
    pub deleted: usize,
    pub bytes_copied: u64,
}

impl ExecSummary {
    pub fn total(&self) -> usize {
        self.copied + self.moved + self.deleted
    }
}

pub struct Executor<'a> {
    dst_root: &'a Path,
    opts: ExecOptions,
}

impl<'a> Executor<'a> {
    pub fn new(dst_root: &'a Path, opts: ExecOptions) -> Self {
        Self { dst_root, opts }
    }

    pub fn run(&self, plan: &Plan) -> Result<ExecSummary, SyncError> {
        let mut summary = ExecSummary::default();
        for op in plan {
            if shutdown::is_requested() {
                warn!(done = summary.total(), remaining = plan.len() - summary.total(), "stopping before next operation");
                return Err(SyncError::Interrupted);
            }
            if self.opts.dry_run {
                self.simulate(op, &mut summary);
            } else {
                self.apply(op, &mut summary)?;
            }
        }
        Ok(summary)
    }

    fn simulate(&self, op: &Operation, summary: &mut ExecSummary) {
        info!(action = %op, "dry-run");
        match op {
            Operation::Copy { src, .. } => {
                summary.copied += 1;
                summary.bytes_copied += fs::metadata(src).map(|m| m.len()).unwrap_or(0);
            }
            Operation::Move { .. } => summary.moved += 1,
            Operation::Delete { .. } => summary.deleted += 1,
        }
    }

    fn apply(&self, op: &Operation, summary: &mut ExecSummary) -> Result<(), SyncError> {
        match op {
            Operation::Delete { path } => {
                fs::remove_file(path).map_err(SyncError::io("delete", path))?;
                info!(path = %path.display(), "Deleted");
                self.vacated(path);
                summary.deleted += 1;
            }
            Operation::Copy { src, dst } => {
                self.prepare_target(dst)?;
                let bytes = safe_copy_and_rename(src, dst)?;
                info!(src = %src.display(), dst = %dst.display(), bytes, "Copied");
                summary.copied += 1;
                summary.bytes_copied += bytes;
            }
            Operation::Move { src, dst } => {
                self.prepare_target(dst)?;
                match try_atomic_move(src, dst) {
                    Ok(()) => {
                        info!(src = %src.display(), dst = %dst.display(), "Renamed");
                    }
                    Err(e) if is_cross_device(&e) => {
                        warn!(error = %e, "Rename crosses devices, falling back to copy+remove");
                        safe_copy_and_rename(src, dst)?;
                        fs::remove_file(src).map_err(SyncError::io("remove moved file", src))?;
                    }
                    Err(e) => return Err(SyncError::io("rename", src)(e)),
                }
                self.vacated(src);
                summary.moved += 1;
            }
        }
        Ok(())
    }

    fn vacated(&self, path: &Path) {
        if self.opts.prune_empty_dirs
            && let Some(parent) = path.parent()
        {
            prune_empty_parents(parent, self.dst_root);
        }
    }

    /// Make `dst` writable as a file. Symlinked ancestors below the root are
    /// unlinked, a directory at `dst` that holds only directories is removed,
    /// and missing parents are created.
    fn prepare_target(&self, dst: &Path) -> Result<(), SyncError> {
        let parent = dst.parent();
        if let Some(parent) = parent {
            self.unlink_symlinked_ancestors(parent)?;
        }
        if let Ok(meta) = fs::symlink_metadata(dst)
            && meta.is_dir()
        {
            remove_directory_skeleton(dst)?;
        }
        if let Some(parent) = parent {
            fs::create_dir_all(parent).map_err(SyncError::io("create directory", parent))?;
        }
        Ok(())
    }

    /// Links are not part of a snapshot, and writing through one would land
    /// outside the destination. The link itself is removed, never its target.
    fn unlink_symlinked_ancestors(&self, dir: &Path) -> Result<(), SyncError> {
        let mut inside: Vec<&Path> = dir
            .ancestors()
            .take_while(|a| *a != self.dst_root && a.starts_with(self.dst_root))
            .collect();
        inside.reverse();

        for anc in inside {
            match fs::symlink_metadata(anc) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    warn!(path = %anc.display(), "replacing symlink in destination with a directory");
                    remove_link(anc)?;
                    return Ok(());
                }
                Ok(_) => {}
                Err(_) => return Ok(()),
            }
        }
        Ok(())
    }
}

/// Remove a directory tree that contains nothing but directories. Any other
/// entry fails the operation before anything is removed.
fn remove_directory_skeleton(dir: &Path) -> Result<(), SyncError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).contents_first(true) {
        let entry = entry.map_err(|source| SyncError::Walk {
            root: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            return Err(SyncError::Io {
                op: "remove directory at write target",
                path: dir.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("'{}' is still in the way", entry.path().display()),
                ),
            });
        }
        dirs.push(entry.into_path());
    }
    debug!(path = %dir.display(), dirs = dirs.len(), "removing emptied directory at write target");
    for d in &dirs {
        fs::remove_dir(d).map_err(SyncError::io("remove directory at write target", d))?;
    }
    Ok(())
}

fn remove_link(link: &Path) -> Result<(), SyncError> {
    // Windows directory links are removed as directories.
    match fs::remove_file(link) {
        Ok(()) => Ok(()),
        #[cfg(windows)]
        Err(_) => fs::remove_dir(link).map_err(SyncError::io("remove symlink", link)),
        #[cfg(not(windows))]
        Err(e) => Err(SyncError::io("remove symlink", link)(e)),
    }
}
