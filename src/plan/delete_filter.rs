//! Drop deletes that would hit a freshly written path.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::trace;

use super::Operation;

/// Remove every `Delete` whose path was already the target of an earlier
/// `Copy` or `Move`. Everything else passes through in order. Idempotent.
pub fn filter_deletes(ops: Vec<Operation>) -> Vec<Operation> {
    let mut targets: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::with_capacity(ops.len());

    for op in ops {
        match &op {
            Operation::Delete { path } => {
                if targets.contains(path) {
                    trace!(path = %path.display(), "suppressing delete of written path");
                    continue;
                }
            }
            Operation::Copy { dst, .. } | Operation::Move { dst, .. } => {
                targets.insert(dst.clone());
            }
        }
        out.push(op);
    }
    out
}
