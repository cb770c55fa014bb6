//! One full sync: hash both trees, plan, execute.

use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::SyncError;
use crate::fs_ops::{ExecOptions, ExecSummary, Executor};
use crate::hasher::{HashOptions, hash_tree_with};
use crate::plan::{Plan, plan};

/// Outcome of [`sync`].
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Operations that were applied (or, in a dry run, would have been).
    pub plan: Plan,
    pub summary: ExecSummary,
}

/// Make `cfg.dest_root` a content-identical copy of `cfg.source_root`.
///
/// Both roots must already exist as directories; use
/// [`validate_and_normalize`](crate::config::validate_and_normalize) for the
/// full set of checks the CLI applies.
pub fn sync(cfg: &Config) -> Result<SyncReport, SyncError> {
    let src_root = cfg.source_root.as_path();
    let dst_root = cfg.dest_root.as_path();
    require_dir(src_root)?;
    require_dir(dst_root)?;

    let hash_opts = HashOptions {
        parallel: cfg.parallel_hashing,
    };
    let src = hash_tree_with(src_root, &hash_opts)?;
    let dst = hash_tree_with(dst_root, &hash_opts)?;
    debug!(
        src_files = src.file_count(),
        dst_files = dst.file_count(),
        src_contents = src.len(),
        dst_contents = dst.len(),
        "hashed both trees"
    );

    let plan = plan(&src, &dst, src_root, dst_root);
    info!(
        copies = plan.copies(),
        moves = plan.moves(),
        deletes = plan.deletes(),
        dry_run = cfg.dry_run,
        "Plan ready"
    );

    let exec = Executor::new(
        dst_root,
        ExecOptions {
            dry_run: cfg.dry_run,
            prune_empty_dirs: cfg.prune_empty_dirs,
        },
    );
    let summary = exec.run(&plan)?;
    Ok(SyncReport { plan, summary })
}

fn require_dir(path: &Path) -> Result<(), SyncError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SyncError::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not an existing directory".into(),
        })
    }
}
