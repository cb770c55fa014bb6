//! Property checks for the planner, run against an in-memory model of the
//! destination tree instead of a real filesystem.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tree_sync::{Fingerprint, Operation, Snapshot, filter_deletes, plan, plan_unfiltered};

// Overlapping names so generated trees collide on files vs directories.
const NAMES: &[&str] = &["a", "b", "c", "a/x", "a/y", "b/z", "c/a/x", "d"];

type Tree = BTreeMap<PathBuf, u8>;

/// Drop every entry that would need a file to also be a directory.
fn well_formed(raw: BTreeMap<&'static str, u8>) -> Tree {
    let mut tree = Tree::new();
    for (name, body) in raw {
        let p = PathBuf::from(name);
        let clashes = tree
            .keys()
            .any(|k: &PathBuf| p.starts_with(k) || k.starts_with(&p));
        if !clashes {
            tree.insert(p, body);
        }
    }
    tree
}

fn tree() -> impl Strategy<Value = Tree> {
    prop::collection::btree_map(prop::sample::select(NAMES), 0u8..4, 0..7).prop_map(well_formed)
}

fn snapshot(tree: &Tree) -> Snapshot {
    tree.iter()
        .map(|(p, body)| (Fingerprint::of_bytes(&[*body]), p.clone()))
        .collect()
}

fn rel(p: &Path, root: &str) -> PathBuf {
    p.strip_prefix(root).expect("path under root").to_path_buf()
}

/// Apply `ops` to `dst`, failing on any step a real filesystem would reject
/// or that would read content that is no longer there.
fn simulate(src: &Tree, mut dst: Tree, ops: &[Operation]) -> Result<Tree, String> {
    fn place(dst: &mut Tree, at: PathBuf, body: u8) -> Result<(), String> {
        if let Some(k) = dst
            .keys()
            .find(|k| **k != at && (at.starts_with(k) || k.starts_with(&at)))
        {
            return Err(format!("{} is blocked by {}", at.display(), k.display()));
        }
        dst.insert(at, body);
        Ok(())
    }

    for op in ops {
        match op {
            Operation::Copy { src: from, dst: to } => {
                let body = *src
                    .get(&rel(from, "s"))
                    .ok_or_else(|| format!("copy from missing {}", from.display()))?;
                place(&mut dst, rel(to, "d"), body)?;
            }
            Operation::Move { src: from, dst: to } => {
                let body = dst
                    .remove(&rel(from, "d"))
                    .ok_or_else(|| format!("move from missing {}", from.display()))?;
                place(&mut dst, rel(to, "d"), body)?;
            }
            Operation::Delete { path } => {
                dst.remove(&rel(path, "d"))
                    .ok_or_else(|| format!("delete of missing {}", path.display()))?;
            }
        }
    }
    Ok(dst)
}

proptest! {
    #[test]
    fn plan_makes_destination_equal_to_source(src in tree(), dst in tree()) {
        let ops = plan(&snapshot(&src), &snapshot(&dst), Path::new("s"), Path::new("d"))
            .into_operations();
        let result = simulate(&src, dst.clone(), &ops);
        prop_assert_eq!(result, Ok(src.clone()), "ops: {:?}", ops);
    }

    #[test]
    fn in_sync_paths_are_untouched(src in tree(), dst in tree()) {
        let ops = plan(&snapshot(&src), &snapshot(&dst), Path::new("s"), Path::new("d"))
            .into_operations();
        for (p, body) in &src {
            if dst.get(p) != Some(body) {
                continue;
            }
            let abs = Path::new("d").join(p);
            let touched = ops.iter().any(|op| match op {
                Operation::Copy { dst, .. } => *dst == abs,
                Operation::Move { src, dst } => *src == abs || *dst == abs,
                Operation::Delete { path } => *path == abs,
            });
            prop_assert!(!touched, "{} is in sync but appears in {:?}", p.display(), ops);
        }
    }

    #[test]
    fn copies_only_for_content_the_destination_lacks_enough_of(src in tree(), dst in tree()) {
        let ops = plan(&snapshot(&src), &snapshot(&dst), Path::new("s"), Path::new("d"))
            .into_operations();
        let count = |t: &Tree, b: u8| t.values().filter(|v| **v == b).count();
        let copies = ops.iter().filter(|op| matches!(op, Operation::Copy { .. })).count();
        let needed: usize = (0u8..4)
            .map(|b| count(&src, b).saturating_sub(count(&dst, b)))
            .sum();
        prop_assert_eq!(copies, needed);
    }

    #[test]
    fn identical_trees_plan_nothing(t in tree()) {
        let s = snapshot(&t);
        prop_assert!(plan(&s, &s, Path::new("s"), Path::new("d")).is_empty());
    }

    #[test]
    fn delete_filter_is_idempotent(src in tree(), dst in tree()) {
        let raw = plan_unfiltered(&snapshot(&src), &snapshot(&dst), Path::new("s"), Path::new("d"));
        let once = filter_deletes(raw);
        prop_assert_eq!(filter_deletes(once.clone()), once);
    }
}
