//! # jsonshard Storage
//!
//! Materialization layer for discovered JSON shapes:
//!
//! - [`RelationalStore`] - SQLite parent/child tables with a raw-payload
//!   column per row
//! - [`DocumentStore`] - append-only JSONL log per entity
//! - [`BatchWriter`] - routes a [`DiscoveryReport`](jsonshard_core::DiscoveryReport)
//!   to the backend each group's storage decision chose
//!
//! Per-record insert failures are isolated: they are logged and counted,
//! never allowed to abort a cluster's persistence.

pub mod document;
pub mod error;
pub mod ident;
pub mod relational;
pub mod router;

pub use document::DocumentStore;
pub use error::{Result, StorageError};
pub use ident::{column_type, sanitize_ident};
pub use relational::{MaterializeOutcome, RelationalOptions, RelationalStore};
pub use router::{BatchWriter, WriteSummary};
