//! Structural signatures
//!
//! A signature reduces a flattened record to the features the clustering
//! distance works on: the set of keypaths, and a per-keypath histogram of
//! the leaf types observed there. Signatures are computed once per
//! clustering pass and discarded afterwards.

use crate::flatten::{flatten, LeafType};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counts of leaf types observed at one keypath.
///
/// Backed by an insertion-ordered vec rather than a map so that "most
/// frequent type" ties resolve to the first type observed - a deterministic
/// tie-break that keeps run-to-run output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeHistogram {
    counts: Vec<(LeafType, u32)>,
}

impl TypeHistogram {
    pub fn bump(&mut self, leaf: LeafType) {
        for (t, c) in &mut self.counts {
            if *t == leaf {
                *c += 1;
                return;
            }
        }
        self.counts.push((leaf, 1));
    }

    /// The most frequent type, ties going to the first observed.
    pub fn top(&self) -> Option<LeafType> {
        let mut best: Option<(LeafType, u32)> = None;
        for &(t, c) in &self.counts {
            if best.map_or(true, |(_, bc)| c > bc) {
                best = Some((t, c));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Number of distinct types observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, leaf: LeafType) -> u32 {
        self.counts
            .iter()
            .find(|(t, _)| *t == leaf)
            .map_or(0, |(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeafType, u32)> + '_ {
        self.counts.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// A record's clustering features: keyset plus per-keypath type histogram.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    /// Every non-empty keypath the record produced, each appearing once.
    pub keys: AHashSet<String>,
    /// Observed leaf types per keypath. A keypath reached several times
    /// (e.g. inside a sampled array) accumulates every occurrence.
    pub types: AHashMap<String, TypeHistogram>,
}

impl Signature {
    /// Build the signature for one record.
    ///
    /// The empty keypath produced by a root-level scalar is excluded from
    /// both the keyset and the histogram.
    pub fn of(record: &Value) -> Self {
        let mut keys = AHashSet::new();
        let mut types: AHashMap<String, TypeHistogram> = AHashMap::new();
        for (path, leaf) in flatten(record) {
            if path.is_empty() {
                continue;
            }
            types.entry(path.clone()).or_default().bump(leaf);
            keys.insert(path);
        }
        Self { keys, types }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
