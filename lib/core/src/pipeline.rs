//! Discovery pipeline
//!
//! Orchestrates the full pass over one in-memory batch: per-record
//! signatures, pairwise distance matrix, density clustering, then schema
//! inference, storage decision, and entity naming per group. The pipeline
//! is synchronous; a caller wanting bounded latency bounds the batch size.

use crate::advisor::{recommend_storage, AdvisorThresholds, StorageDecision};
use crate::cluster::{dbscan, partition, ClusterParams, GroupId};
use crate::distance::DistanceMatrix;
use crate::naming::propose_entity_names;
use crate::schema::{infer_schema, SchemaDescriptor};
use crate::signature::Signature;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Everything discovered about one group of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: GroupId,
    /// Positions of the member records in the input batch.
    pub indices: Vec<usize>,
    pub schema: SchemaDescriptor,
    pub storage: StorageDecision,
    /// Candidate entity names, best first. The first is authoritative for
    /// table/collection naming.
    pub proposed_entities: Vec<String>,
}

/// Result of one discovery pass over a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Cluster label per input record; -1 marks noise.
    pub labels: Vec<i64>,
    /// One entry per discovered group, noise singletons included.
    pub groups: Vec<ClusterSummary>,
}

/// Configured discovery engine.
#[derive(Debug, Clone, Default)]
pub struct ShapeDiscovery {
    pub params: ClusterParams,
    pub thresholds: AdvisorThresholds,
}

impl ShapeDiscovery {
    pub fn new(params: ClusterParams, thresholds: AdvisorThresholds) -> Self {
        Self { params, thresholds }
    }

    /// Run the full discovery pass. An empty batch yields an empty report.
    pub fn discover(&self, records: &[Value]) -> DiscoveryReport {
        if records.is_empty() {
            return DiscoveryReport::default();
        }

        let signatures: Vec<Signature> = records.iter().map(Signature::of).collect();
        let matrix = DistanceMatrix::build(&signatures);
        let labels = dbscan(&matrix, &self.params);

        let groups = partition(&labels)
            .into_iter()
            .map(|group| {
                let schema = infer_schema(records, &group.indices);
                let storage = recommend_storage(&schema, &self.thresholds);
                let proposed_entities = propose_entity_names(&schema);
                debug!(
                    group = %group.id,
                    members = group.indices.len(),
                    fields = schema.len(),
                    storage = %storage,
                    "group discovered"
                );
                ClusterSummary {
                    id: group.id,
                    indices: group.indices,
                    schema,
                    storage,
                    proposed_entities,
                }
            })
            .collect();

        DiscoveryReport { labels, groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::NOISE;
    use serde_json::json;

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let report = ShapeDiscovery::default().discover(&[]);
        assert!(report.labels.is_empty());
        assert!(report.groups.is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Two flat records cluster together and route to SQL; the third is
        // noise, becomes a singleton, and its arrays + depth route to NoSQL.
        let records = vec![
            json!({"id": 1, "name": "a"}),
            json!({"id": 2, "name": "b"}),
            json!({"id": 3, "tags": ["x", "y"], "meta": {"x": {"y": {"z": 1}}}}),
        ];
        let report = ShapeDiscovery::default().discover(&records);

        assert_eq!(report.labels[0], report.labels[1]);
        assert_ne!(report.labels[0], NOISE);
        assert_eq!(report.labels[2], NOISE);
        assert_eq!(report.groups.len(), 2);

        let flat = &report.groups[0];
        assert_eq!(flat.indices, vec![0, 1]);
        assert_eq!(flat.storage, StorageDecision::Sql);
        assert_eq!(flat.id, GroupId::Cluster(report.labels[0]));

        let singleton = &report.groups[1];
        assert_eq!(singleton.id, GroupId::Noise(2));
        assert_eq!(singleton.indices, vec![2]);
        assert!(singleton.schema.contains_key("tags[]"));
        assert!(singleton.schema.contains_key("meta.x.y.z"));
        assert_eq!(singleton.storage, StorageDecision::NoSql);
    }

    #[test]
    fn test_same_input_yields_same_partition() {
        let records = vec![
            json!({"id": 1, "name": "a"}),
            json!({"sensor": "s", "reading": 1.0}),
            json!({"id": 2, "name": "b"}),
            json!({"sensor": "t", "reading": 2.0}),
        ];
        let engine = ShapeDiscovery::default();
        let first = engine.discover(&records);
        let second = engine.discover(&records);
        let partition_of = |r: &DiscoveryReport| -> Vec<Vec<usize>> {
            r.groups.iter().map(|g| g.indices.clone()).collect()
        };
        assert_eq!(partition_of(&first), partition_of(&second));
    }

    #[test]
    fn test_report_serializes() {
        let records = vec![json!({"id": 1}), json!({"id": 2})];
        let report = ShapeDiscovery::default().discover(&records);
        let encoded = serde_json::to_string(&report).unwrap();
        let decoded: DiscoveryReport = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.labels, report.labels);
        assert_eq!(decoded.groups.len(), report.groups.len());
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_group() {
        let records = vec![
            json!({"id": 1, "name": "a"}),
            json!({"weird": {"deep": {"thing": [1]}}}),
            json!({"id": 2, "name": "b"}),
        ];
        let report = ShapeDiscovery::default().discover(&records);
        let mut seen = vec![false; records.len()];
        for group in &report.groups {
            for &i in &group.indices {
                assert!(!seen[i], "record {i} appears in two groups");
                seen[i] = true;
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }
}
