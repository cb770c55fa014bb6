//! Execution ordering for a filtered plan.
//!
//! Per-fingerprint planning says *what* has to happen but not in which order it
//! is safe. A write may not land on a path whose current file is still needed
//! (a pending Move source) or still in the way (a file where a directory must
//! go, or a directory tree where a file must go). Every operation that vacates a
//! conflicting path therefore runs before the write. Rename cycles such as
//! `a <-> b` cannot be ordered; one Move of the cycle is split through a
//! staging name under the destination root.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Operation;

/// File name prefix of staging paths created to break rename cycles.
pub const STAGE_PREFIX: &str = ".tree_sync-stage-";

/// Sort key: original position, then 0 for the op itself / 1 for a split-off tail.
type Rank = (usize, u8);

struct Graph {
    ops: Vec<Operation>,
    rank: Vec<Rank>,
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
    indeg: Vec<usize>,
}

impl Graph {
    fn build(ops: Vec<Operation>) -> Self {
        let n = ops.len();
        let mut vacates: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
        for (i, op) in ops.iter().enumerate() {
            if let Some(p) = op.vacated() {
                vacates.entry(p.to_path_buf()).or_default().push(i);
            }
        }

        let mut g = Graph {
            rank: (0..n).map(|i| (i, 0)).collect(),
            out: vec![Vec::new(); n],
            inc: vec![Vec::new(); n],
            indeg: vec![0; n],
            ops,
        };

        for w in 0..n {
            let Some(target) = g.ops[w].write_target() else {
                continue;
            };
            let preds: Vec<usize> = conflicting(&vacates, target).collect();
            for v in preds {
                g.out[v].push(w);
                g.inc[w].push(v);
                g.indeg[w] += 1;
            }
        }
        g
    }

    fn push(&mut self, op: Operation, rank: Rank) -> usize {
        self.ops.push(op);
        self.rank.push(rank);
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        self.indeg.push(0);
        self.ops.len() - 1
    }

    /// Turn `Move(src -> dst)` at `m` into `Move(src -> stage)` (keeps id `m`,
    /// keeps the outgoing edges) plus a new `Move(stage -> dst)` that inherits
    /// the incoming edges. Returns the id of the new tail node.
    fn split(&mut self, m: usize, stage: PathBuf) -> usize {
        let Operation::Move { src, dst } = self.ops[m].clone() else {
            unreachable!("only moves are split");
        };
        let tail = self.push(Operation::move_(stage.clone(), dst), (self.rank[m].0, 1));
        self.ops[m] = Operation::move_(src, stage);

        let preds = std::mem::take(&mut self.inc[m]);
        for &p in &preds {
            for e in self.out[p].iter_mut().filter(|e| **e == m) {
                *e = tail;
            }
        }
        self.inc[tail] = preds;
        self.indeg[tail] = self.indeg[m];
        self.indeg[m] = 0;
        tail
    }
}

/// Vacating ops whose path equals `target`, lies above it, or lies below it.
fn conflicting<'a>(
    vacates: &'a BTreeMap<PathBuf, Vec<usize>>,
    target: &'a Path,
) -> impl Iterator<Item = usize> + 'a {
    let same_or_above = target
        .ancestors()
        .filter_map(|a| vacates.get(a))
        .flatten()
        .copied();
    let below = vacates
        .range::<Path, _>((Bound::Excluded(target), Bound::Unbounded))
        .take_while(move |(p, _)| p.starts_with(target))
        .flat_map(|(_, ids)| ids.iter().copied());
    same_or_above.chain(below)
}

/// Reorder `ops` so every vacating operation precedes the writes it conflicts
/// with. Order is otherwise preserved; a plan without hazards comes back
/// unchanged. `taken` lists absolute destination paths a staging name must
/// not collide with.
pub fn sequence(ops: Vec<Operation>, dst_root: &Path, taken: &HashSet<PathBuf>) -> Vec<Operation> {
    let mut g = Graph::build(ops);
    let mut ready: BTreeSet<(Rank, usize)> = (0..g.ops.len())
        .filter(|&i| g.indeg[i] == 0)
        .map(|i| (g.rank[i], i))
        .collect();
    let mut done = vec![false; g.ops.len()];
    let mut order: Vec<usize> = Vec::with_capacity(g.ops.len());
    let mut stages = StageNames::new(dst_root, taken);

    while order.len() < g.ops.len() {
        while let Some((_, i)) = ready.pop_first() {
            done[i] = true;
            order.push(i);
            for k in 0..g.out[i].len() {
                let w = g.out[i][k];
                g.indeg[w] -= 1;
                if g.indeg[w] == 0 {
                    ready.insert((g.rank[w], w));
                }
            }
        }
        if order.len() == g.ops.len() {
            break;
        }

        // Everything left waits on something else left: a cycle of moves.
        let candidate = (0..g.ops.len())
            .filter(|&i| !done[i] && matches!(g.ops[i], Operation::Move { .. }))
            .filter(|&i| g.out[i].iter().any(|&w| !done[w]))
            .min_by_key(|&i| g.rank[i]);
        let Some(m) = candidate else {
            debug_assert!(false, "sequencing stalled without a splittable move");
            let mut rest: Vec<usize> = (0..g.ops.len()).filter(|&i| !done[i]).collect();
            rest.sort_by_key(|&i| g.rank[i]);
            order.extend(rest);
            break;
        };

        let stage = stages.next_free();
        debug!(op = %g.ops[m], stage = %stage.display(), "breaking rename cycle");
        g.split(m, stage);
        done.push(false);
        ready.insert((g.rank[m], m));
    }

    let mut slots: Vec<Option<Operation>> = g.ops.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

struct StageNames<'a> {
    root: &'a Path,
    taken: &'a HashSet<PathBuf>,
    next: usize,
}

impl<'a> StageNames<'a> {
    fn new(root: &'a Path, taken: &'a HashSet<PathBuf>) -> Self {
        Self { root, taken, next: 0 }
    }

    fn next_free(&mut self) -> PathBuf {
        loop {
            let candidate = self.root.join(format!("{STAGE_PREFIX}{}", self.next));
            self.next += 1;
            if !self.taken.iter().any(|p| p.starts_with(&candidate)) {
                return candidate;
            }
        }
    }
}
