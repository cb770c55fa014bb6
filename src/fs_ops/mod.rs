//! Filesystem side of a sync: applying plans to the destination tree.

mod atomic;
mod copy;
mod executor;
pub(crate) mod helpers;
mod io_copy;
mod util;

pub use executor::{ExecOptions, ExecSummary, Executor};
