//! # jsonshard Core
//!
//! Shape discovery engine for heterogeneous JSON batches.
//!
//! Given a batch of parsed JSON records with no known common schema, this
//! crate discovers which records share a structural shape, infers a schema
//! per discovered group, and chooses a storage representation for each:
//!
//! - [`flatten`](crate::flatten) - keypath flattening with `[]` array markers
//! - [`Signature`] - per-record keyset + type histogram clustering features
//! - [`DistanceMatrix`] - pairwise Jaccard + type-penalty distances
//! - [`dbscan`] - density clustering over the precomputed matrix
//! - [`infer_schema`] - per-group presence/type/example aggregation
//! - [`recommend_storage`] - the relational-vs-document heuristic
//! - [`ShapeDiscovery`] - the orchestrated pipeline
//!
//! ## Example
//!
//! ```rust
//! use jsonshard_core::{ShapeDiscovery, StorageDecision};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": 1, "name": "a"}),
//!     json!({"id": 2, "name": "b"}),
//! ];
//! let report = ShapeDiscovery::default().discover(&records);
//! assert_eq!(report.groups.len(), 1);
//! assert_eq!(report.groups[0].storage, StorageDecision::Sql);
//! ```
//!
//! Flattening, clustering, and inference never fail: empty batches produce
//! empty reports, records with no leaves produce empty signatures, and
//! unresolvable example paths resolve to `None`. The crate exposes no
//! error type because none of its operations has an error case.

pub mod advisor;
pub mod cluster;
pub mod distance;
pub mod flatten;
pub mod naming;
pub mod pipeline;
pub mod schema;
pub mod signature;

pub use advisor::{recommend_storage, AdvisorThresholds, StorageDecision};
pub use cluster::{dbscan, partition, ClusterGroup, ClusterParams, GroupId, NOISE};
pub use distance::{jaccard_distance, signature_distance, type_penalty, DistanceMatrix, TYPE_PENALTY_WEIGHT};
pub use flatten::{flatten, LeafType, ARRAY_SAMPLE};
pub use naming::propose_entity_names;
pub use pipeline::{ClusterSummary, DiscoveryReport, ShapeDiscovery};
pub use schema::{example_at_path, infer_schema, FieldStats, SchemaDescriptor};
pub use signature::{Signature, TypeHistogram};
