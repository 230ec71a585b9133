// Generic union-find over opaque labels.
//
// Labels (here: region `Color`s) are mapped to dense slot indices through an
// `FxHashMap`; the forest itself is a pair of `Vec`s (parent, rank) indexed
// by slot. The slot arrays never leave this module; callers only observe
// `find()` equality.
//
// Two flavors of find:
// - `find_mut()` compresses paths. Used while a mutation batch is being
//   applied, when the engine is exclusively owned.
// - `find()` takes `&self` and never writes. Snapshots call `flatten()` once
//   when they are frozen, after which every slot points straight at its
//   root and `find()` is O(1) without hidden mutation. This keeps a frozen
//   snapshot safe to share between threads.
//
// Union is by rank, so even an unflattened forest stays O(log n) deep.
//
// See also: `connectivity.rs`, which keeps one static and one dynamic
// partition of colors.

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Union-find keyed by arbitrary `Copy` labels.
#[derive(Clone, Debug)]
pub struct DisjointSet<L> {
    slots: FxHashMap<L, u32>,
    labels: Vec<L>,
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl<L> Default for DisjointSet<L> {
    fn default() -> Self {
        Self {
            slots: FxHashMap::default(),
            labels: Vec::new(),
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }
}

impl<L: Copy + Eq + Hash + Debug> DisjointSet<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every label ever inserted, in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = L> + '_ {
        self.labels.iter().copied()
    }

    /// Add `label` as a singleton set. Returns `false` (and changes nothing)
    /// if it was already present.
    pub fn insert(&mut self, label: L) -> bool {
        if self.slots.contains_key(&label) {
            return false;
        }
        let slot = u32::try_from(self.labels.len()).expect("disjoint set exceeds u32 slots");
        self.slots.insert(label, slot);
        self.labels.push(label);
        self.parent.push(slot);
        self.rank.push(0);
        true
    }

    fn slot(&self, label: L) -> u32 {
        match self.slots.get(&label) {
            Some(&slot) => slot,
            None => panic!("label {label:?} is not in the disjoint set"),
        }
    }

    fn root(&self, mut slot: u32) -> u32 {
        while self.parent[slot as usize] != slot {
            slot = self.parent[slot as usize];
        }
        slot
    }

    fn root_compressing(&mut self, slot: u32) -> u32 {
        let root = self.root(slot);
        let mut cur = slot;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Canonical representative of `label`'s set, without modifying the
    /// forest. Panics if `label` was never inserted.
    pub fn find(&self, label: L) -> L {
        self.labels[self.root(self.slot(label)) as usize]
    }

    /// Canonical representative with path compression. Panics if `label`
    /// was never inserted.
    pub fn find_mut(&mut self, label: L) -> L {
        let slot = self.slot(label);
        let root = self.root_compressing(slot);
        self.labels[root as usize]
    }

    /// Merge the sets containing `a` and `b`. Returns the representative of
    /// the merged set. Panics if either label is absent.
    pub fn union(&mut self, a: L, b: L) -> L {
        let ra = self.root_compressing(self.slot(a));
        let rb = self.root_compressing(self.slot(b));
        if ra == rb {
            return self.labels[ra as usize];
        }
        let (rank_a, rank_b) = (self.rank[ra as usize], self.rank[rb as usize]);
        let root = if rank_a < rank_b {
            self.parent[ra as usize] = rb;
            rb
        } else {
            self.parent[rb as usize] = ra;
            if rank_a == rank_b {
                self.rank[ra as usize] = rank_a.saturating_add(1);
            }
            ra
        };
        self.labels[root as usize]
    }

    /// Put every known label back into its own singleton set. O(n).
    pub fn reset_to_singletons(&mut self) {
        for (slot, parent) in self.parent.iter_mut().enumerate() {
            *parent = slot as u32;
        }
        self.rank.fill(0);
    }

    /// Make this partition equal to `other`'s: reset to singletons, adopt any
    /// labels only `other` knows, then union every label with its
    /// representative in `other`.
    pub fn copy_partition_from(&mut self, other: &DisjointSet<L>) {
        self.reset_to_singletons();
        for label in other.labels() {
            self.insert(label);
        }
        for label in other.labels() {
            let rep = other.find(label);
            if rep != label {
                self.union(label, rep);
            }
        }
    }

    /// Point every slot directly at its root, so subsequent `find()` calls
    /// take one step.
    pub fn flatten(&mut self) {
        for slot in 0..self.parent.len() as u32 {
            self.root_compressing(slot);
        }
    }
}
