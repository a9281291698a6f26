//! # jsonshard
//!
//! Shape discovery and storage routing for heterogeneous JSON batches.
//!
//! Given a batch of JSON records with no known common schema, jsonshard
//! discovers which records share a structural shape (keypath flattening,
//! structural signatures, density clustering), infers a schema per shape,
//! and routes each shape to the storage that fits it: flat stable shapes
//! become SQLite parent/child tables, nested or drifting ones become
//! append-only JSONL document logs.
//!
//! ## Quick Start
//!
//! ### As a Binary
//!
//! ```bash
//! jsonshard ./inbox --db-path store.db --document-dir document_store
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use jsonshard::prelude::*;
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": 1, "name": "a"}),
//!     json!({"id": 2, "name": "b"}),
//!     json!({"id": 3, "tags": ["x"], "meta": {"x": {"y": {"z": 1}}}}),
//! ];
//!
//! let report = ShapeDiscovery::default().discover(&records);
//! let writer = BatchWriter::new("store.db", "document_store");
//! let summary = writer.write(&records, &report).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - [`jsonshard-core`](jsonshard_core) - flattening, signatures,
//!   distances, clustering, schema inference, the storage heuristic
//! - [`jsonshard-storage`](jsonshard_storage) - SQLite and JSONL
//!   materialization plus batch routing

/// Input-file loading and metadata injection for the binary.
pub mod ingest;

// Re-export the discovery engine
pub use jsonshard_core::{
    AdvisorThresholds, ClusterParams, ClusterSummary, DiscoveryReport, FieldStats, GroupId,
    LeafType, SchemaDescriptor, ShapeDiscovery, Signature, StorageDecision,
};

// Re-export storage
pub use jsonshard_storage::{
    BatchWriter, DocumentStore, MaterializeOutcome, RelationalOptions, RelationalStore,
    StorageError, WriteSummary,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AdvisorThresholds, BatchWriter, ClusterParams, ClusterSummary, DiscoveryReport,
        DocumentStore, GroupId, LeafType, RelationalOptions, RelationalStore, SchemaDescriptor,
        ShapeDiscovery, StorageDecision, WriteSummary,
    };
}
