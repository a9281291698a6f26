//! Keypath flattening
//!
//! Turns one JSON value into an ordered list of (keypath, leaf type) pairs.
//! Object keys are joined with `.`; an array contributes a synthetic `[]`
//! segment and is never index-expanded, so the output describes a record's
//! schema rather than its contents.
//!
//! Array contents are sampled: the first `min(3, len)` elements are
//! flattened under the array path and merged by keypath, with the first
//! element to produce a given keypath winning. Later elements that disagree
//! in type at the same path are silently dropped. This is a documented
//! limitation of the sampling scheme, not something to correct downstream.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How many leading array elements are sampled during flattening.
pub const ARRAY_SAMPLE: usize = 3;

/// Structural type of a JSON leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    /// Kinds a JSON parser cannot produce but a foreign schema snapshot may
    /// still carry. Mapped to a text column during materialization.
    Unknown,
}

impl LeafType {
    /// Structural type of a parsed JSON value.
    ///
    /// Bool is matched before Number: booleans are numeric in some source
    /// representations and must not be folded into them.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => LeafType::Null,
            Value::Bool(_) => LeafType::Bool,
            Value::Number(_) => LeafType::Number,
            Value::String(_) => LeafType::String,
            Value::Array(_) => LeafType::Array,
            Value::Object(_) => LeafType::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeafType::Null => "null",
            LeafType::Bool => "bool",
            LeafType::Number => "number",
            LeafType::String => "string",
            LeafType::Array => "array",
            LeafType::Object => "object",
            LeafType::Unknown => "unknown",
        }
    }
}

/// Flatten a JSON value into (keypath, leaf type) pairs.
///
/// A root-level scalar produces a single pair with an empty keypath; the
/// signature builder excludes it, so only object-shaped records contribute
/// to clustering features.
pub fn flatten(value: &Value) -> Vec<(String, LeafType)> {
    let mut out = Vec::new();
    flatten_into(value, "", &mut out);
    out
}

fn flatten_into(value: &Value, path: &str, out: &mut Vec<(String, LeafType)>) {
    match value {
        Value::Object(map) => {
            // own key order, concatenated in key order
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(child, &child_path, out);
            }
        }
        Value::Array(items) => {
            let arr_path = format!("{path}[]");
            out.push((arr_path.clone(), LeafType::Array));
            if items.is_empty() {
                return;
            }
            // Seeding with the array path itself drops the leaves primitive
            // elements would emit at it: `a[]` stays a single array marker.
            let mut seen: AHashSet<String> = AHashSet::new();
            seen.insert(arr_path.clone());
            for item in items.iter().take(ARRAY_SAMPLE) {
                let mut element = Vec::new();
                flatten_into(item, &arr_path, &mut element);
                for (p, t) in element {
                    if seen.insert(p.clone()) {
                        out.push((p, t));
                    }
                }
            }
        }
        scalar => out.push((path.to_string(), LeafType::of(scalar))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_object() {
        let pairs = flatten(&json!({"a": {"b": 1}}));
        assert_eq!(pairs, vec![("a.b".to_string(), LeafType::Number)]);
    }

    #[test]
    fn test_primitive_array_is_a_single_marker() {
        let pairs = flatten(&json!({"a": [1, 2, 3]}));
        assert_eq!(pairs, vec![("a[]".to_string(), LeafType::Array)]);
    }

    #[test]
    fn test_array_of_objects_unions_sampled_elements() {
        let pairs = flatten(&json!({"items": [{"id": 1, "tags": ["x"]}, {"id": 2}]}));
        assert_eq!(
            pairs,
            vec![
                ("items[]".to_string(), LeafType::Array),
                ("items[].id".to_string(), LeafType::Number),
                ("items[].tags[]".to_string(), LeafType::Array),
            ]
        );
    }

    #[test]
    fn test_first_sampled_element_wins_on_type_disagreement() {
        let pairs = flatten(&json!({"xs": [{"v": 1}, {"v": "two"}]}));
        assert_eq!(
            pairs,
            vec![
                ("xs[]".to_string(), LeafType::Array),
                ("xs[].v".to_string(), LeafType::Number),
            ]
        );
    }

    #[test]
    fn test_sampling_stops_after_three_elements() {
        let pairs = flatten(&json!({"xs": [{"a": 1}, {"b": 2}, {"c": 3}, {"d": 4}]}));
        let paths: Vec<&str> = pairs.iter().map(|(p, _)| p.as_str()).collect();
        assert!(paths.contains(&"xs[].c"));
        assert!(!paths.contains(&"xs[].d"));
    }

    #[test]
    fn test_root_scalar_has_empty_keypath() {
        let pairs = flatten(&json!(42));
        assert_eq!(pairs, vec![(String::new(), LeafType::Number)]);
    }

    #[test]
    fn test_bool_is_not_number() {
        let pairs = flatten(&json!({"flag": true}));
        assert_eq!(pairs, vec![("flag".to_string(), LeafType::Bool)]);
    }

    #[test]
    fn test_empty_object_has_no_leaves() {
        assert!(flatten(&json!({})).is_empty());
    }

    #[test]
    fn test_null_leaf() {
        let pairs = flatten(&json!({"gone": null}));
        assert_eq!(pairs, vec![("gone".to_string(), LeafType::Null)]);
    }
}
