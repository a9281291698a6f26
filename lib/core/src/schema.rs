//! Per-cluster schema inference
//!
//! Aggregates field presence, type distribution, and an example value for
//! every keypath seen across one group's member records. The descriptor is
//! keyed by a sorted map so iteration order is deterministic.

use crate::flatten::flatten;
use crate::signature::TypeHistogram;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Aggregated statistics for one keypath within a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldStats {
    /// Fraction of member records containing this keypath at least once.
    pub presence: f64,
    /// Every observed occurrence; can exceed the presence count when a
    /// keypath recurs inside a record (e.g. via sampled array elements).
    pub types: TypeHistogram,
    /// First resolvable non-container value, in group order. `None` when
    /// no member record resolves a scalar at this path.
    pub example: Option<Value>,
}

/// Inferred schema for one cluster, sorted by keypath.
pub type SchemaDescriptor = BTreeMap<String, FieldStats>;

/// Infer the schema for the records at `indices`.
///
/// Presence is counted at most once per record per keypath; the divisor is
/// floored at 1 so an empty group cannot divide by zero.
pub fn infer_schema(records: &[Value], indices: &[usize]) -> SchemaDescriptor {
    let mut presence: AHashMap<String, u32> = AHashMap::new();
    let mut types: AHashMap<String, TypeHistogram> = AHashMap::new();
    let mut examples: AHashMap<String, Value> = AHashMap::new();
    let group_size = indices.len().max(1);

    for &i in indices {
        let record = &records[i];
        let mut seen_in_record: AHashSet<String> = AHashSet::new();
        for (path, leaf) in flatten(record) {
            if path.is_empty() {
                continue;
            }
            types.entry(path.clone()).or_default().bump(leaf);
            if seen_in_record.insert(path.clone()) {
                *presence.entry(path.clone()).or_insert(0) += 1;
            }
            if !examples.contains_key(&path) {
                if let Some(value) = example_at_path(record, &path) {
                    examples.insert(path, value.clone());
                }
            }
        }
    }

    let mut schema = SchemaDescriptor::new();
    for (path, count) in presence {
        let stats = FieldStats {
            presence: f64::from(count) / group_size as f64,
            types: types.remove(&path).unwrap_or_default(),
            example: examples.remove(&path),
        };
        schema.insert(path, stats);
    }
    schema
}

/// Resolve a keypath to a non-container value inside one record.
///
/// Segments ending in `[]` descend into the named key and then into the
/// first array element. Any missing key, wrong container kind, or empty
/// array fails the resolution with `None`; this never errors.
pub fn example_at_path<'a>(record: &'a Value, keypath: &str) -> Option<&'a Value> {
    let mut cur = record;
    for part in keypath.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            cur = cur.as_object()?.get(key)?;
            cur = cur.as_array()?.first()?;
        } else {
            cur = cur.as_object()?.get(part)?;
        }
    }
    if cur.is_object() || cur.is_array() {
        None
    } else {
        Some(cur)
    }
}
