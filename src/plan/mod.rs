//! Sync plans: the operations that turn a destination tree into a copy of a
//! source tree, and the pure logic that computes them.

mod delete_filter;
mod planner;
mod sequence;

pub use delete_filter::filter_deletes;
pub use planner::{plan, plan_unfiltered, reconcile_same_content};
pub use sequence::{STAGE_PREFIX, sequence};

use std::fmt;
use std::path::{Path, PathBuf};

/// One filesystem step. Paths are absolute (root-joined).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create `dst` from the content of `src`; `src` stays.
    Copy { src: PathBuf, dst: PathBuf },
    /// Rename a destination-tree file; `src` is consumed.
    Move { src: PathBuf, dst: PathBuf },
    /// Remove a destination-tree file.
    Delete { path: PathBuf },
}

impl Operation {
    pub fn copy(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Operation::Copy {
            src: src.into(),
            dst: dst.into(),
        }
    }

    pub fn move_(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Operation::Move {
            src: src.into(),
            dst: dst.into(),
        }
    }

    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Operation::Delete { path: path.into() }
    }

    /// Destination path this operation writes, if any.
    pub fn write_target(&self) -> Option<&Path> {
        match self {
            Operation::Copy { dst, .. } | Operation::Move { dst, .. } => Some(dst),
            Operation::Delete { .. } => None,
        }
    }

    /// Destination-tree path this operation removes, if any.
    pub fn vacated(&self) -> Option<&Path> {
        match self {
            Operation::Move { src, .. } => Some(src),
            Operation::Delete { path } => Some(path),
            Operation::Copy { .. } => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Copy { src, dst } => write!(f, "COPY {} -> {}", src.display(), dst.display()),
            Operation::Move { src, dst } => write!(f, "MOVE {} -> {}", src.display(), dst.display()),
            Operation::Delete { path } => write!(f, "DELETE {}", path.display()),
        }
    }
}

/// Ordered list of operations, ready for the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    ops: Vec<Operation>,
}

impl Plan {
    pub fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn copies(&self) -> usize {
        self.count(|op| matches!(op, Operation::Copy { .. }))
    }

    pub fn moves(&self) -> usize {
        self.count(|op| matches!(op, Operation::Move { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count(|op| matches!(op, Operation::Delete { .. }))
    }

    fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;
    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}
