//! Storage-shape heuristic
//!
//! Maps a cluster's schema descriptor to a relational-vs-document decision.
//! The rule is a deterministic pure function of the schema and the
//! tunable thresholds; it is advisory and can misclassify. A wrong choice
//! is a quality issue, never an error.

use crate::schema::SchemaDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage representation chosen for a cluster. Computed once, never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageDecision {
    #[serde(rename = "SQL")]
    Sql,
    #[serde(rename = "NoSQL")]
    NoSql,
}

impl fmt::Display for StorageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageDecision::Sql => write!(f, "SQL"),
            StorageDecision::NoSql => write!(f, "NoSQL"),
        }
    }
}

/// Thresholds for the storage heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdvisorThresholds {
    /// Nesting depth (number of `.` separators) at which a schema goes NoSQL.
    pub max_depth: usize,
    /// Fraction of multi-typed fields above which a schema goes NoSQL.
    pub type_drift: f64,
    /// Mean presence ratio below which a schema goes NoSQL.
    pub min_presence: f64,
}

impl Default for AdvisorThresholds {
    fn default() -> Self {
        Self {
            max_depth: 3,
            type_drift: 0.15,
            min_presence: 0.7,
        }
    }
}

/// Choose a storage representation for a schema.
///
/// NoSQL when any field is an array, nesting reaches `max_depth`, type
/// drift exceeds its threshold, or fields are too optional on average;
/// SQL otherwise. An empty schema counts as fully present and lands on SQL.
pub fn recommend_storage(
    schema: &SchemaDescriptor,
    thresholds: &AdvisorThresholds,
) -> StorageDecision {
    let field_count = schema.len();
    let avg_presence = if field_count == 0 {
        1.0
    } else {
        schema.values().map(|f| f.presence).sum::<f64>() / field_count as f64
    };
    let has_array_field = schema.keys().any(|k| k.contains("[]"));
    let max_depth = schema
        .keys()
        .map(|k| k.matches('.').count())
        .max()
        .unwrap_or(0);
    let type_drift = if field_count == 0 {
        0.0
    } else {
        schema.values().filter(|f| f.types.distinct() > 1).count() as f64 / field_count as f64
    };

    if has_array_field
        || max_depth >= thresholds.max_depth
        || type_drift > thresholds.type_drift
        || avg_presence < thresholds.min_presence
    {
        StorageDecision::NoSql
    } else {
        StorageDecision::Sql
    }
}
