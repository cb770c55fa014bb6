//! Per-fingerprint reconciliation of two snapshots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::{Operation, Plan, filter_deletes, sequence};
use crate::snapshot::Snapshot;

/// Compute the plan that makes `dst_root` a content-identical copy of `src_root`.
///
/// The raw per-fingerprint operations are passed through [`filter_deletes`] and
/// then ordered by [`sequence`], so the result is safe to execute as-is.
pub fn plan(src: &Snapshot, dst: &Snapshot, src_root: &Path, dst_root: &Path) -> Plan {
    let raw = plan_unfiltered(src, dst, src_root, dst_root);
    let filtered = filter_deletes(raw);

    let taken: HashSet<PathBuf> = dst
        .paths()
        .chain(src.paths())
        .map(|p| dst_root.join(p))
        .collect();
    Plan::new(sequence(filtered, dst_root, &taken))
}

/// Per-fingerprint operations in snapshot order, before any filtering or reordering.
pub fn plan_unfiltered(
    src: &Snapshot,
    dst: &Snapshot,
    src_root: &Path,
    dst_root: &Path,
) -> Vec<Operation> {
    let mut ops = Vec::new();

    for (fp, src_paths) in src.iter() {
        match dst.get(fp) {
            Some(dst_paths) => {
                trace!(fingerprint = %fp, "reconciling shared content");
                ops.extend(reconcile_same_content(src_paths, dst_paths, src_root, dst_root));
            }
            None => {
                ops.extend(
                    src_paths
                        .iter()
                        .map(|p| Operation::copy(src_root.join(p), dst_root.join(p))),
                );
            }
        }
    }

    // Content that only the destination has.
    for (fp, dst_paths) in dst.iter().filter(|(fp, _)| !src.contains(fp)) {
        trace!(fingerprint = %fp, "dropping destination-only content");
        ops.extend(dst_paths.iter().map(|p| Operation::delete(dst_root.join(p))));
    }

    ops
}

/// Reconcile the source and destination paths of one shared fingerprint.
///
/// Paths present on both sides are left alone. Each remaining source path
/// takes over a leftover destination duplicate (last one first) by rename;
/// once those run out it is copied. Destination duplicates nobody claimed are
/// deleted.
pub fn reconcile_same_content(
    src_paths: &[PathBuf],
    dst_paths: &[PathBuf],
    src_root: &Path,
    dst_root: &Path,
) -> Vec<Operation> {
    let src_set: HashSet<&PathBuf> = src_paths.iter().collect();
    let dst_set: HashSet<&PathBuf> = dst_paths.iter().collect();

    let src_only = src_paths.iter().filter(|p| !dst_set.contains(p));
    let mut dst_only: Vec<&PathBuf> = dst_paths.iter().filter(|p| !src_set.contains(p)).collect();

    let mut ops = Vec::new();
    for s in src_only {
        let to = dst_root.join(s);
        match dst_only.pop() {
            Some(d) => ops.push(Operation::move_(dst_root.join(d), to)),
            None => ops.push(Operation::copy(src_root.join(s), to)),
        }
    }
    ops.extend(dst_only.into_iter().map(|d| Operation::delete(dst_root.join(d))));
    ops
}
