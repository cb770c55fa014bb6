//! I/O error hints.
//!
//! Turns raw OS error codes into a short actionable suffix that is appended to
//! `SyncError::Io` messages, e.g.
//!   "rename '/dst/a': Permission denied (os error 13) — permission denied; check
//!    ownership and write permissions. [os code: 13]"

use std::io;

/// Platform-aware hint for an io::Error (empty when nothing useful can be said).
pub(crate) fn hint_for(e: &io::Error) -> String {
    let mut msg = String::new();

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" — permission denied; check ownership and write permissions.");
                }
                libc::EXDEV => {
                    msg.push_str(" — cross-filesystem; rename not possible.");
                }
                libc::EBUSY => {
                    msg.push_str(" — resource busy; ensure no other process is using the tree.");
                }
                libc::ENOENT => {
                    msg.push_str(" — path not found; the tree changed while syncing?");
                }
                libc::ENOTEMPTY | libc::EISDIR => {
                    msg.push_str(" — a directory occupies a file path that is being written.");
                }
                libc::ENOTDIR => {
                    msg.push_str(" — a file occupies a directory path that is being written.");
                }
                libc::ENOSPC => {
                    msg.push_str(" — insufficient space on device.");
                }
                libc::EROFS => {
                    msg.push_str(" — read-only filesystem; cannot write here.");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" — filename or path too long; shorten path segments.");
                }
                libc::EMFILE | libc::ENFILE => {
                    msg.push_str(" — too many open files; raise limits.");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" — access denied; check permissions."),
                17 => msg.push_str(" — not same device; cross-filesystem move."),
                32 => msg.push_str(" — sharing violation; file is in use."),
                2 | 3 => msg.push_str(" — path not found; the tree changed while syncing?"),
                112 => msg.push_str(" — insufficient disk space."),
                206 => msg.push_str(" — filename or path too long (MAX_PATH exceeded)."),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" — permission denied; check ownership and write permissions.");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" — path not found; the tree changed while syncing?");
            }
            _ => {}
        }
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_only_errors_get_a_hint() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(hint_for(&e).contains("permission denied"));
    }

    #[test]
    fn unknown_errors_get_no_hint() {
        let e = io::Error::other("weird");
        assert!(hint_for(&e).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn os_errors_carry_the_code() {
        let e = io::Error::from_raw_os_error(libc::ENOSPC);
        let h = hint_for(&e);
        assert!(h.contains("insufficient space"));
        assert!(h.contains(&format!("[os code: {}]", libc::ENOSPC)));
    }
}
