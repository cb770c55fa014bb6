//! Typed error definitions for tree_sync.
//! Hashing and execution surface these; planning never fails.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::helpers::hint_for;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{op} '{}': {source}{}", .path.display(), hint_for(.source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed walking '{}': {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid root {}: {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SyncError {
    /// Stable numeric code used in structured logs.
    pub fn code(&self) -> u8 {
        match self {
            SyncError::Io { .. } => 1,
            SyncError::Walk { .. } => 2,
            SyncError::InvalidRoot { .. } => 3,
            SyncError::Interrupted => 130,
        }
    }

    /// Short machine-friendly kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Io { .. } => "io",
            SyncError::Walk { .. } => "walk",
            SyncError::InvalidRoot { .. } => "invalid_root",
            SyncError::Interrupted => "interrupted",
        }
    }

    /// Returns a closure for `.map_err(...)` that wraps an io::Error with the
    /// operation name and the path it touched.
    pub fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> SyncError + 'a {
        move |source| SyncError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
