//! Entity naming
//!
//! Derives human-readable candidate names for a cluster from its most
//! frequent root-level keypath segments. Names are best effort and not
//! guaranteed unique across clusters; the first candidate is the one used
//! for table and collection naming.

use crate::schema::SchemaDescriptor;

/// Domain hints mapping a lowercase root segment to a friendly entity name.
const ROOT_HINTS: &[(&str, &str)] = &[
    ("user", "User"),
    ("person", "Person"),
    ("customer", "Customer"),
    ("order", "Order"),
    ("item", "Item"),
    ("product", "Product"),
    ("sensor", "SensorReading"),
    ("reading", "SensorReading"),
    ("event", "Event"),
    ("log", "Log"),
    ("transaction", "Transaction"),
    ("image", "ImageMeta"),
    ("video", "VideoMeta"),
    ("media", "MediaMeta"),
];

/// Propose up to three candidate entity names for a schema.
///
/// Roots are the first segment of every keypath (array markers stripped),
/// ranked by frequency with ties resolved by first appearance in the
/// sorted schema. Unmapped roots are capitalized verbatim; duplicates are
/// removed preserving order. A schema with no roots yields `["Entity"]`.
pub fn propose_entity_names(schema: &SchemaDescriptor) -> Vec<String> {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for key in schema.keys() {
        let root = key
            .split('.')
            .next()
            .unwrap_or("")
            .trim_end_matches("[]");
        if root.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(r, _)| *r == root) {
            Some((_, c)) => *c += 1,
            None => counts.push((root, 1)),
        }
    }
    // stable sort: insertion order breaks frequency ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut names: Vec<String> = Vec::new();
    for (root, _) in counts.into_iter().take(3) {
        let lower = root.to_lowercase();
        let name = ROOT_HINTS
            .iter()
            .find(|(hint, _)| *hint == lower)
            .map(|(_, friendly)| (*friendly).to_string())
            .unwrap_or_else(|| capitalize(root));
        if !names.contains(&name) {
            names.push(name);
        }
    }
    if names.is_empty() {
        names.push("Entity".to_string());
    }
    names
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_schema;
    use serde_json::json;

    #[test]
    fn test_hinted_root_maps_to_friendly_name() {
        let records = vec![json!({"user": {"id": 1, "name": "a"}, "note": "x"})];
        let schema = infer_schema(&records, &[0]);
        let names = propose_entity_names(&schema);
        assert_eq!(names[0], "User");
    }

    #[test]
    fn test_sensor_and_reading_share_a_name() {
        let records = vec![json!({"sensor": "s1", "reading": 0.5})];
        let schema = infer_schema(&records, &[0]);
        let names = propose_entity_names(&schema);
        // both roots map to SensorReading; deduplicated preserving order
        assert_eq!(names, vec!["SensorReading"]);
    }

    #[test]
    fn test_unmapped_root_is_capitalized() {
        let records = vec![json!({"gadget": {"id": 1}})];
        let schema = infer_schema(&records, &[0]);
        assert_eq!(propose_entity_names(&schema), vec!["Gadget"]);
    }

    #[test]
    fn test_array_marker_stripped_from_root() {
        let records = vec![json!({"order": [{"sku": "a"}]})];
        let schema = infer_schema(&records, &[0]);
        assert_eq!(propose_entity_names(&schema)[0], "Order");
    }

    #[test]
    fn test_most_frequent_root_comes_first() {
        let records = vec![json!({
            "product": {"id": 1, "name": "a", "price": 2.0},
            "misc": true
        })];
        let schema = infer_schema(&records, &[0]);
        let names = propose_entity_names(&schema);
        assert_eq!(names[0], "Product");
        assert!(names.contains(&"Misc".to_string()));
    }

    #[test]
    fn test_empty_schema_falls_back_to_entity() {
        let schema = SchemaDescriptor::new();
        assert_eq!(propose_entity_names(&schema), vec!["Entity"]);
    }

    #[test]
    fn test_at_most_three_candidates() {
        let records = vec![json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5})];
        let schema = infer_schema(&records, &[0]);
        assert_eq!(propose_entity_names(&schema).len(), 3);
    }

    #[test]
    fn test_capitalize_lowercases_the_tail() {
        assert_eq!(capitalize("myThing"), "Mything");
        assert_eq!(capitalize("x"), "X");
    }
}
