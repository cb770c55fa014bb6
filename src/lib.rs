//! Core library for `tree_sync`.
//!
//! Makes a destination directory tree a content-identical copy of a source
//! tree. Files are matched by content fingerprint, so a file that already
//! exists in the destination under another name is renamed into place rather
//! than copied again.
//!
//! Pipeline: [`hash_tree`] both roots, [`plan`] the operations (deletes of
//! freshly written paths are dropped by [`filter_deletes`], unsafe orderings
//! fixed by [`sequence`]), then apply them with an [`Executor`]. [`sync`] runs
//! the whole pipeline from a [`Config`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod hasher;
pub mod output;
pub mod plan;
pub mod shutdown;
pub mod snapshot;
pub mod sync;

pub use config::{Config, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use errors::SyncError;
pub use fs_ops::{ExecOptions, ExecSummary, Executor};
pub use hasher::{HashOptions, hash_file, hash_tree, hash_tree_with};
pub use plan::{Operation, Plan, filter_deletes, plan, plan_unfiltered, reconcile_same_content, sequence};
pub use snapshot::{Fingerprint, Snapshot};
pub use sync::{SyncReport, sync};
