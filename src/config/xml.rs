//! XML configuration support.
//!
//! Uses quick-xml + serde to parse a small `<config>` file:
//! <config>
//!   <source>/path/to/source</source>
//!   <destination>/path/to/mirror</destination>
//!   <log_level>normal</log_level>
//!   <log_file>/path/to/tree_sync.log</log_file>
//!   <dry_run>false</dry_run>
//!   <parallel_hashing>true</parallel_hashing>
//!   <prune_empty_dirs>true</prune_empty_dirs>
//! </config>
//!
//! Every element is optional. Unknown elements are rejected so typos surface
//! instead of being silently ignored.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    source: Option<String>,
    destination: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    dry_run: Option<bool>,
    parallel_hashing: Option<bool>,
    prune_empty_dirs: Option<bool>,
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
}

impl XmlConfig {
    /// Overlay the values present in the file onto `cfg`.
    fn apply_to(self, cfg: &mut Config) -> Result<()> {
        if let Some(p) = non_empty_path(self.source.as_deref()) {
            cfg.source_root = p;
        }
        if let Some(p) = non_empty_path(self.destination.as_deref()) {
            cfg.dest_root = p;
        }
        if let Some(raw) = self.log_level.as_deref() {
            cfg.log_level = raw.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
        }
        if let Some(p) = non_empty_path(self.log_file.as_deref()) {
            cfg.log_file = Some(p);
        }
        if let Some(v) = self.dry_run {
            cfg.dry_run = v;
        }
        if let Some(v) = self.parallel_hashing {
            cfg.parallel_hashing = v;
        }
        if let Some(v) = self.prune_empty_dirs {
            cfg.prune_empty_dirs = v;
        }
        Ok(())
    }
}

/// Parse config XML text on top of the defaults.
pub fn parse_config_xml(contents: &str) -> Result<Config> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;
    let mut cfg = Config::default();
    parsed.apply_to(&mut cfg)?;
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_config_xml(&contents).with_context(|| format!("in config file '{}'", path.display()))
}

/// Load the config from `$TREE_SYNC_CONFIG` or the default location.
/// Ok(None) when no file exists there, so callers fall back to defaults.
pub fn load_config() -> Result<Option<(PathBuf, Config)>> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok(Some((path, cfg)))
}

/// Write a commented template config at `path`. Refuses to overwrite an
/// existing file or to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/tree_sync.log".into());

    let content = format!(
        "<!--\n  tree_sync configuration (XML)\n\n    source            -> tree whose content is authoritative\n    destination       -> tree made to match the source (renames preferred over copies)\n    log_level         -> quiet | normal | info | debug\n    log_file          -> optional log file (stdout is still used)\n    dry_run           -> true: print the plan, change nothing\n    parallel_hashing  -> digest files on all cores\n    prune_empty_dirs  -> remove directories emptied by the sync\n\n  Command-line arguments override these values.\n-->\n<config>\n  <source></source>\n  <destination></destination>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n  <dry_run>false</dry_run>\n  <parallel_hashing>true</parallel_hashing>\n  <prune_empty_dirs>true</prune_empty_dirs>\n</config>\n",
        suggested_log
    );

    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts
        .open(path)
        .with_context(|| format!("create config file '{}'", path.display()))?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    info!("Created template config at {}", path.display());
    Ok(())
}
