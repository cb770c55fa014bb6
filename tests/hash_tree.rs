use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::path::PathBuf;

use tree_sync::{Fingerprint, HashOptions, SyncError, hash_tree, hash_tree_with};

#[test]
fn groups_paths_by_content() {
    let td = TempDir::new().unwrap();
    td.child("one").write_str("foo").unwrap();
    td.child("two").write_str("foo").unwrap();
    td.child("sub/three").write_str("bar").unwrap();

    let snap = hash_tree(td.path()).unwrap();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap.file_count(), 3);
    assert_eq!(
        snap.get(&Fingerprint::of_bytes(b"foo")).unwrap(),
        &[PathBuf::from("one"), PathBuf::from("two")]
    );
    assert_eq!(
        snap.get(&Fingerprint::of_bytes(b"bar")).unwrap(),
        &[PathBuf::from("sub").join("three")]
    );
}

#[test]
fn empty_tree_gives_empty_snapshot() {
    let td = TempDir::new().unwrap();
    td.child("only/dirs/here").create_dir_all().unwrap();
    let snap = hash_tree(td.path()).unwrap();
    assert!(snap.is_empty());
}

#[test]
fn paths_are_relative_to_the_root() {
    let td = TempDir::new().unwrap();
    td.child("a/b/c.txt").write_str("x").unwrap();
    let snap = hash_tree(td.path()).unwrap();
    let paths: Vec<_> = snap.paths().collect();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].is_relative());
    assert_eq!(paths[0], PathBuf::from("a").join("b").join("c.txt"));
}

#[test]
fn parallel_matches_sequential() {
    let td = TempDir::new().unwrap();
    for i in 0..40 {
        td.child(format!("d{}/f{i}", i % 5))
            .write_str(&format!("content {}", i % 7))
            .unwrap();
    }
    let seq = hash_tree_with(td.path(), &HashOptions { parallel: false }).unwrap();
    let par = hash_tree_with(td.path(), &HashOptions { parallel: true }).unwrap();
    assert_eq!(seq, par);
    assert_eq!(
        seq.fingerprints().collect::<Vec<_>>(),
        par.fingerprints().collect::<Vec<_>>()
    );
}

#[test]
fn missing_root_is_an_error() {
    let td = TempDir::new().unwrap();
    let err = hash_tree(&td.path().join("absent")).unwrap_err();
    assert!(matches!(err, SyncError::Walk { .. }), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped() {
    let td = TempDir::new().unwrap();
    td.child("real").write_str("data").unwrap();
    std::os::unix::fs::symlink(td.child("real").path(), td.child("link").path()).unwrap();
    std::os::unix::fs::symlink(td.path(), td.child("loop").path()).unwrap();

    let snap = hash_tree(td.path()).unwrap();
    assert_eq!(snap.file_count(), 1);
    assert_eq!(
        snap.get(&Fingerprint::of_bytes(b"data")).unwrap(),
        &[PathBuf::from("real")]
    );
}

#[cfg(unix)]
#[test]
fn unreadable_file_fails_the_walk() {
    use std::os::unix::fs::PermissionsExt;

    // root reads through mode bits
    if unsafe { libc::geteuid() } == 0 {
        eprintln!("skipping: running as root");
        return;
    }
    let td = TempDir::new().unwrap();
    let f = td.child("secret");
    f.write_str("x").unwrap();
    std::fs::set_permissions(f.path(), std::fs::Permissions::from_mode(0o000)).unwrap();

    let err = hash_tree(td.path()).unwrap_err();
    std::fs::set_permissions(f.path(), std::fs::Permissions::from_mode(0o600)).unwrap();
    match err {
        SyncError::Io { path, source, .. } => {
            assert_eq!(path, f.path());
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}
