//! XML config loading from explicit paths, without touching user state.

use std::fs;
use tempfile::tempdir;

use tree_sync::LogLevel;
use tree_sync::config::{create_template_config, load_config_from_xml_path};

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().expect("create tempdir");

    let cfg_path = td.path().join("config.xml");
    let source = td.path().join("photos");
    let destination = td.path().join("backup");
    let log_file = td.path().join("tree_sync.log");

    let xml = format!(
        r#"
<config>
  <source>{}</source>
  <destination>{}</destination>
  <log_level>info</log_level>
  <log_file>{}</log_file>
  <parallel_hashing>false</parallel_hashing>
</config>
"#,
        source.display(),
        destination.display(),
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");

    assert_eq!(cfg.source_root, source, "source mismatch");
    assert_eq!(cfg.dest_root, destination, "destination mismatch");
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()));
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert!(!cfg.parallel_hashing);
    assert!(!cfg.dry_run, "dry_run keeps its default");
    assert!(cfg.prune_empty_dirs, "prune_empty_dirs keeps its default");
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><source>/a</config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err:#}").contains("config.xml"), "{err:#}");
}

#[test]
fn missing_file_is_an_error() {
    let td = tempdir().unwrap();
    assert!(load_config_from_xml_path(&td.path().join("nope.xml")).is_err());
}

#[test]
fn template_loads_back_with_defaults() {
    let td = tempdir().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let path = root.join("nested/dir/config.xml");

    create_template_config(&path).expect("template written");
    let cfg = load_config_from_xml_path(&path).expect("template parses");
    assert!(cfg.source_root.as_os_str().is_empty());
    assert!(cfg.dest_root.as_os_str().is_empty());
    assert_eq!(cfg.log_level, LogLevel::Normal);
    assert!(cfg.parallel_hashing);
    assert!(cfg.prune_empty_dirs);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
fn template_never_overwrites() {
    let td = tempdir().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let path = root.join("config.xml");
    fs::write(&path, "<config/>").unwrap();
    assert!(create_template_config(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "<config/>");
}
