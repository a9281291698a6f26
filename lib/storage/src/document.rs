//! Document materialization
//!
//! One append-only, line-delimited log file per entity. Records are
//! written verbatim (any injected metadata fields included); there is no
//! deduplication, indexing, or schema validation on this path.

use crate::error::Result;
use crate::ident::sanitize_ident;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSONL store rooted at one directory.
pub struct DocumentStore {
    base_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Append records to the entity's log, one JSON document per line.
    /// Returns the log path.
    pub fn append(&self, entity: &str, records: &[&Value]) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir)?;
        let stem = sanitize_ident(if entity.is_empty() { "entity" } else { entity });
        let path = self.base_dir.join(format!("{stem}.jsonl"));

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let records = vec![json!({"a": 1}), json!({"b": [1, 2]})];
        let refs: Vec<&Value> = records.iter().collect();

        let path = store.append("Event", &refs).unwrap();
        assert_eq!(path.file_name().unwrap(), "event.jsonl");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, records);
    }

    #[test]
    fn test_append_is_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let first = vec![json!({"n": 1})];
        let second = vec![json!({"n": 2})];

        store.append("e", &first.iter().collect::<Vec<_>>()).unwrap();
        let path = store
            .append("e", &second.iter().collect::<Vec<_>>())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_entity_name_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let records = vec![json!({"x": 1})];
        let path = store
            .append("Weird/Name!", &records.iter().collect::<Vec<_>>())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "weird_name_.jsonl");
    }
}
