//! The shutdown flag is process-wide, so these tests run serially and always
//! clear it again.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use serial_test::serial;

use tree_sync::{Config, ExecOptions, Executor, Operation, Plan, SyncError, shutdown, sync};

#[test]
#[serial]
fn executor_stops_before_first_operation() {
    let dst = TempDir::new().unwrap();
    dst.child("a").write_str("1").unwrap();

    shutdown::request();
    let res = Executor::new(dst.path(), ExecOptions::default())
        .run(&Plan::new(vec![Operation::delete(dst.child("a").path())]));
    shutdown::reset();

    assert!(matches!(res, Err(SyncError::Interrupted)), "got {res:?}");
    assert!(dst.child("a").path().exists(), "nothing ran after the request");
}

#[test]
#[serial]
fn sync_reports_interruption_during_hashing() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    src.child("f").write_str("x").unwrap();

    shutdown::request();
    let res = sync(&Config::new(src.path(), dst.path()));
    shutdown::reset();

    let err = res.unwrap_err();
    assert!(matches!(err, SyncError::Interrupted));
    assert_eq!(err.code(), 130);
    assert!(!dst.child("f").path().exists());
}

#[test]
#[serial]
fn reset_allows_the_next_run() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    src.child("f").write_str("x").unwrap();

    shutdown::request();
    shutdown::reset();
    sync(&Config::new(src.path(), dst.path())).expect("runs after reset");
    assert!(dst.child("f").path().exists());
}
