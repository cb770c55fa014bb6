//! Content fingerprints and per-tree fingerprint groupings.
//!
//! A [`Snapshot`] maps each fingerprint to the relative paths carrying it.
//! Fingerprints iterate in insertion order and paths keep the order they were
//! added in, so everything downstream (the planner in particular) is
//! reproducible for a given input.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// SHA-256 digest of a file's full contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub const LEN: usize = 32;

    pub fn from_digest(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest an in-memory buffer.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps plan/snapshot debug dumps readable.
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl FromStr for Fingerprint {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut out)
            .map_err(|e| format!("invalid fingerprint '{s}': {e}"))?;
        Ok(Self(out))
    }
}

/// Fingerprint -> relative paths grouping for one directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    order: Vec<Fingerprint>,
    groups: HashMap<Fingerprint, Vec<PathBuf>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the group of `fp`, creating the group at the end of
    /// the iteration order when it is new.
    pub fn insert(&mut self, fp: Fingerprint, path: impl Into<PathBuf>) {
        match self.groups.entry(fp) {
            Entry::Occupied(mut e) => e.get_mut().push(path.into()),
            Entry::Vacant(e) => {
                self.order.push(fp);
                e.insert(vec![path.into()]);
            }
        }
        // `iter` indexes `groups` by every key in `order`.
        debug_assert_eq!(self.order.len(), self.groups.len());
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<&[PathBuf]> {
        self.groups.get(fp).map(Vec::as_slice)
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.groups.contains_key(fp)
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &[PathBuf])> {
        self.order
            .iter()
            .map(move |fp| (fp, self.groups[fp].as_slice()))
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }

    /// All relative paths, group by group.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.iter().flat_map(|(_, paths)| paths.iter().map(PathBuf::as_path))
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of files.
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl<P: Into<PathBuf>> FromIterator<(Fingerprint, P)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Fingerprint, P)>>(iter: I) -> Self {
        let mut snap = Snapshot::new();
        for (fp, path) in iter {
            snap.insert(fp, path);
        }
        snap
    }
}
