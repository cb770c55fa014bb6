use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".tree_sync.{}.{}.tmp", pid, nanos))
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // io::ErrorKind::CrossesDevices is not stable everywhere; match raw codes.
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Remove `start` and then each parent while they are empty directories,
/// never touching `root` itself or anything outside it.
pub(super) fn prune_empty_parents(start: &Path, root: &Path) {
    let mut cur = Some(start);
    while let Some(dir) = cur {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        // Fails on non-empty (or already gone) directories, which ends the climb.
        if fs::remove_dir(dir).is_err() {
            break;
        }
        cur = dir.parent();
    }
}
