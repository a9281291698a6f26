//! Batch routing
//!
//! Takes one discovery report plus its record batch and materializes every
//! group: SQL-routed clusters go to the relational store, the rest to
//! per-entity document logs. A fresh relational handle is opened per
//! materialization call and released when it goes out of scope.

use crate::document::DocumentStore;
use crate::error::Result;
use crate::relational::{RelationalOptions, RelationalStore};
use jsonshard_core::{DiscoveryReport, StorageDecision};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Totals across one routed batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteSummary {
    /// Parent rows inserted on the relational path.
    pub sql_rows: usize,
    /// Records appended on the document path.
    pub documents: usize,
    /// Records skipped after an isolated insert failure.
    pub failed: usize,
}

/// Routes discovered groups to their chosen storage backend.
pub struct BatchWriter {
    db_path: PathBuf,
    document_dir: PathBuf,
    options: RelationalOptions,
}

impl BatchWriter {
    pub fn new(db_path: impl AsRef<Path>, document_dir: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            document_dir: document_dir.as_ref().to_path_buf(),
            options: RelationalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RelationalOptions) -> Self {
        self.options = options;
        self
    }

    /// Materialize every group in the report.
    ///
    /// The first proposed entity name is authoritative for table and
    /// collection naming. Assumes single-writer access to the database and
    /// each document log for the duration of the batch.
    pub fn write(&self, records: &[Value], report: &DiscoveryReport) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        for group in &report.groups {
            let entity = group
                .proposed_entities
                .first()
                .map(String::as_str)
                .unwrap_or("Entity");
            let members: Vec<&Value> = group.indices.iter().map(|&i| &records[i]).collect();

            match group.storage {
                StorageDecision::Sql => {
                    let mut store = RelationalStore::open(&self.db_path, self.options)?;
                    let outcome = store.materialize(entity, &group.schema, &members)?;
                    info!(
                        group = %group.id,
                        table = %outcome.table,
                        rows = outcome.inserted,
                        child_rows = outcome.child_rows,
                        "cluster materialized to SQL"
                    );
                    summary.sql_rows += outcome.inserted;
                    summary.failed += outcome.failed;
                }
                StorageDecision::NoSql => {
                    let store = DocumentStore::new(&self.document_dir);
                    let path = store.append(entity, &members)?;
                    info!(
                        group = %group.id,
                        collection = %path.display(),
                        docs = members.len(),
                        "cluster materialized to document log"
                    );
                    summary.documents += members.len();
                }
            }
        }
        Ok(summary)
    }
}
