//! Input loading and metadata injection
//!
//! The filesystem collaborator in front of the discovery core: finds JSON
//! inputs by extension, parses whole-file JSON with a line-delimited
//! fallback, and stamps caller-supplied metadata onto every record before
//! the batch reaches the engine. The core itself only ever sees
//! well-formed, already-parsed objects.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const JSON_EXTS: &[&str] = &["json", "jsonl", "ndjson"];

fn has_json_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| JSON_EXTS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Recursively collect JSON input files under `path` (or `path` itself
/// when it is a file). Results are sorted for a stable batch order.
pub fn collect_json_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if path.is_dir() {
        collect_dir(path, &mut found)
            .with_context(|| format!("scanning {}", path.display()))?;
    } else if has_json_ext(path) {
        found.push(path.to_path_buf());
    }
    found.sort();
    Ok(found)
}

fn collect_dir(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, found)?;
        } else if has_json_ext(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Load the JSON objects in one file.
///
/// The whole file is tried first: a top-level object is a singleton batch,
/// a top-level array keeps its object elements, anything else is empty.
/// When whole-file parsing fails the file is re-read line by line as
/// NDJSON, silently skipping malformed or non-object lines.
pub fn load_json_objects(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(match value {
            Value::Object(_) => vec![value],
            Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
            _ => Vec::new(),
        });
    }

    let mut objects = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) if value.is_object() => objects.push(value),
            Ok(_) => {}
            Err(e) => debug!(file = %path.display(), error = %e, "skipping malformed line"),
        }
    }
    Ok(objects)
}

/// Stamp caller metadata onto every record.
///
/// Each object record gains `_meta` with the full metadata value; records
/// lacking a `metacomments` field also gain one, taken from the metadata's
/// `metacomments`/`comment`/`comments` keys in that order (or the metadata
/// itself when it is not an object).
pub fn inject_metadata(records: &mut [Value], meta: &Value) {
    let comment: Option<Value> = match meta {
        Value::Object(map) => ["metacomments", "comment", "comments"]
            .iter()
            .find_map(|k| map.get(*k))
            .cloned(),
        Value::String(s) => Some(Value::String(s.clone())),
        other => Some(Value::String(other.to_string())),
    };

    for record in records {
        let Some(map) = record.as_object_mut() else {
            continue;
        };
        if let Some(comment) = &comment {
            if !map.contains_key("metacomments") {
                map.insert("metacomments".to_string(), comment.clone());
            }
        }
        map.insert("_meta".to_string(), meta.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_whole_file_object_and_array() {
        let dir = tempfile::tempdir().unwrap();
        let single = write_file(dir.path(), "one.json", r#"{"a": 1}"#);
        assert_eq!(load_json_objects(&single).unwrap(), vec![json!({"a": 1})]);

        let many = write_file(dir.path(), "many.json", r#"[{"a": 1}, 42, {"b": 2}]"#);
        assert_eq!(
            load_json_objects(&many).unwrap(),
            vec![json!({"a": 1}), json!({"b": 2})]
        );
    }

    #[test]
    fn test_ndjson_fallback_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "data.ndjson",
            "{\"a\": 1}\nnot json\n\n{\"b\": 2}\n",
        );
        assert_eq!(
            load_json_objects(&path).unwrap(),
            vec![json!({"a": 1}), json!({"b": 2})]
        );
    }

    #[test]
    fn test_empty_file_is_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.json", "   \n");
        assert!(load_json_objects(&path).unwrap().is_empty());
    }

    #[test]
    fn test_collect_filters_by_extension_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(dir.path(), "a.json", "{}");
        write_file(dir.path(), "skip.txt", "nope");
        write_file(&dir.path().join("sub"), "b.jsonl", "{}");

        let found = collect_json_inputs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.jsonl"]);
    }

    #[test]
    fn test_inject_metadata() {
        let mut records = vec![
            json!({"id": 1}),
            json!({"id": 2, "metacomments": "kept"}),
        ];
        let meta = json!({"metacomments": "note", "source": "ui"});
        inject_metadata(&mut records, &meta);

        assert_eq!(records[0]["metacomments"], json!("note"));
        assert_eq!(records[0]["_meta"], meta);
        // an existing metacomments field is never overwritten
        assert_eq!(records[1]["metacomments"], json!("kept"));
        assert_eq!(records[1]["_meta"], meta);
    }

    #[test]
    fn test_inject_non_object_metadata() {
        let mut records = vec![json!({"id": 1})];
        inject_metadata(&mut records, &json!("just a note"));
        assert_eq!(records[0]["metacomments"], json!("just a note"));
    }
}
