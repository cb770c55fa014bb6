//! Default path helpers and symlink checks.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TREE_SYNC_CONFIG";

/// Config file location: `$TREE_SYNC_CONFIG` if set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("tree_sync");
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("tree_sync")
                .join("config.xml")
        })
    }
}

/// Suggested log file location (OS data dir). Not created here.
pub fn default_log_path() -> Option<PathBuf> {
    data_dir().map(|base| base.join("tree_sync").join("tree_sync.log"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.as_os_str().is_empty() {
            break;
        }
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn plain_directories_are_not_symlinks() {
        let td = tempdir().unwrap();
        let root = dunce::canonicalize(td.path()).unwrap();
        let p = root.join("a/b/log.txt");
        assert!(!path_has_symlink_ancestor(&p).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_is_detected() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("log.txt")).unwrap());
    }
}
