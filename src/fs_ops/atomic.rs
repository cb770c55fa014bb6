//! Rename helper.
//! - Overwrites an existing destination file (Windows needs it removed first).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.is_file() {
            if let Err(e) = fs::remove_file(dst) {
                if e.kind() != io::ErrorKind::NotFound {
                    return Err(e);
                }
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // A failed fsync must not turn a completed rename into a failure.
        let _ = super::util::fsync_dir(parent);
    }

    Ok(())
}
