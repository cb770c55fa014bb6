//! Directory hashing.
//!
//! Walks a tree (sorted by file name, links not followed), digests every
//! regular file and groups the root-relative paths by fingerprint.
//!
//! Policy for entries that are not regular files:
//! - symbolic links, FIFOs, sockets and devices are skipped (logged at debug);
//! - anything that cannot be read, including permission-denied directories or
//!   files, aborts the walk with an error. No partial snapshot is returned.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::SyncError;
use crate::shutdown;
use crate::snapshot::{Fingerprint, Snapshot};

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB reads

/// Knobs for [`hash_tree_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HashOptions {
    /// Digest files on the rayon pool. Groupings are identical either way.
    pub parallel: bool,
}

/// Stream a file through SHA-256.
pub fn hash_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let file = File::open(path).map_err(SyncError::io("open for hashing", path))?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(SyncError::io("read for hashing", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint::from_digest(hasher.finalize().into()))
}

/// Sequentially hash every regular file under `root`.
pub fn hash_tree(root: &Path) -> Result<Snapshot, SyncError> {
    hash_tree_with(root, &HashOptions::default())
}

pub fn hash_tree_with(root: &Path, opts: &HashOptions) -> Result<Snapshot, SyncError> {
    let files = list_files(root)?;
    debug!(root = %root.display(), files = files.len(), parallel = opts.parallel, "hashing tree");

    let digest_one = |rel: &PathBuf| -> Result<Fingerprint, SyncError> {
        if shutdown::is_requested() {
            return Err(SyncError::Interrupted);
        }
        hash_file(&root.join(rel))
    };

    // Collected in walk order in both modes, so the snapshot does not depend on scheduling.
    let digests: Vec<Fingerprint> = if opts.parallel {
        files.par_iter().map(digest_one).collect::<Result<_, _>>()?
    } else {
        files.iter().map(digest_one).collect::<Result<_, _>>()?
    };

    Ok(digests.into_iter().zip(files).collect())
}

/// Regular files under `root`, relative to it, in sorted walk order.
fn list_files(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| SyncError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let ftype = entry.file_type();
        if ftype.is_dir() {
            continue;
        }
        if !ftype.is_file() {
            debug!(path = %entry.path().display(), symlink = ftype.is_symlink(), "skipping non-regular entry");
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        files.push(rel);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn same_content_same_fingerprint() {
        let dir = assert_fs::TempDir::new().unwrap();
        let a = dir.child("a");
        let b = dir.child("b");
        a.write_str("foo").unwrap();
        b.write_str("foo").unwrap();

        let ha = hash_file(a.path()).unwrap();
        let hb = hash_file(b.path()).unwrap();
        assert_eq!(ha, hb);
        assert_ne!(ha, Fingerprint::of_bytes(b""));
        assert_eq!(ha, Fingerprint::of_bytes(b"foo"));
    }

    #[test]
    fn different_content_different_fingerprint() {
        let dir = assert_fs::TempDir::new().unwrap();
        let a = dir.child("a");
        let b = dir.child("b");
        a.write_str("foo").unwrap();
        b.write_str("bar").unwrap();
        assert_ne!(hash_file(a.path()).unwrap(), hash_file(b.path()).unwrap());
    }

    #[test]
    fn large_file_is_fully_covered() {
        let dir = assert_fs::TempDir::new().unwrap();
        let f = dir.child("big");
        let mut data = vec![7u8; BUF_SIZE * 2 + 17];
        f.write_binary(&data).unwrap();
        let before = hash_file(f.path()).unwrap();
        assert_eq!(before, Fingerprint::of_bytes(&data));

        // Flip the very last byte; the digest must notice.
        let last = data.len() - 1;
        data[last] = 8;
        f.write_binary(&data).unwrap();
        assert_ne!(hash_file(f.path()).unwrap(), before);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let err = hash_file(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got {err:?}");
    }
}
