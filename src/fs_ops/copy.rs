//! Safe copy-and-rename:
//! - copies into a temp file next to the destination (fsynced by io_copy)
//! - renames the temp file over the destination
//! - leaves the old destination intact if anything before the rename fails

use std::fs;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::{io_copy, util};
use crate::errors::SyncError;

/// Copy `src` over `dest`. The parent of `dest` must exist. Returns bytes copied.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = util::unique_temp_path(dest_dir);

    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(SyncError::io("copy", src)(e));
        }
    };

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(SyncError::io("rename copied file into place", dest)(e));
    }

    Ok(bytes)
}
