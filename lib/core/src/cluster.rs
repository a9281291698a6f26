//! Density-based clustering over the precomputed distance matrix
//!
//! Standard DBSCAN: a record with at least `min_pts` neighbours within
//! `eps` (itself included) is a core point; clusters are the transitive
//! closure of overlapping core neighbourhoods plus any border points they
//! reach. Everything else is noise.
//!
//! Label values are an artifact of discovery order and carry no meaning
//! beyond grouping - two runs may number identically-shaped clusters
//! differently while producing the same partition. Callers should treat
//! [`GroupId`] as an opaque grouping key, never as an entity identifier.

use crate::distance::DistanceMatrix;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Label for records not density-reachable from any core point.
pub const NOISE: i64 = -1;

const UNCLASSIFIED: i64 = -2;

/// Tunables for the density clustering pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Neighbourhood radius in distance units (inclusive).
    pub eps: f64,
    /// Minimum neighbourhood size (including the point itself) for a core point.
    pub min_pts: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 0.35,
            min_pts: 2,
        }
    }
}

/// Assign a cluster label per record; [`NOISE`] marks unclustered records.
pub fn dbscan(matrix: &DistanceMatrix, params: &ClusterParams) -> Vec<i64> {
    let n = matrix.len();
    let mut labels = vec![UNCLASSIFIED; n];
    let mut next_label = 0i64;

    for p in 0..n {
        if labels[p] != UNCLASSIFIED {
            continue;
        }
        let neighbours = region_query(matrix, p, params.eps);
        if neighbours.len() < params.min_pts {
            labels[p] = NOISE;
            continue;
        }
        labels[p] = next_label;
        let mut queue: VecDeque<usize> = neighbours.into();
        while let Some(q) = queue.pop_front() {
            if labels[q] == NOISE {
                // border point: joins the cluster but is not expanded
                labels[q] = next_label;
                continue;
            }
            if labels[q] != UNCLASSIFIED {
                continue;
            }
            labels[q] = next_label;
            let reachable = region_query(matrix, q, params.eps);
            if reachable.len() >= params.min_pts {
                queue.extend(reachable);
            }
        }
        next_label += 1;
    }
    labels
}

fn region_query(matrix: &DistanceMatrix, p: usize, eps: f64) -> Vec<usize> {
    (0..matrix.len())
        .filter(|&q| matrix.get(p, q) <= eps)
        .collect()
}

/// Opaque grouping key for a discovered cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupId {
    /// A density-connected group, carrying its (run-local) label.
    Cluster(i64),
    /// A singleton group synthesized from the noise record at this index.
    Noise(usize),
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Cluster(label) => write!(f, "cluster_{label}"),
            GroupId::Noise(index) => write!(f, "cluster_single_{index}"),
        }
    }
}

/// Record indices sharing one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub id: GroupId,
    pub indices: Vec<usize>,
}

/// Partition labelled records into groups.
///
/// Non-noise labels become one group each, in label discovery order. Noise
/// records are never dropped: each becomes its own singleton group,
/// appended in record order.
pub fn partition(labels: &[i64]) -> Vec<ClusterGroup> {
    let mut order: Vec<i64> = Vec::new();
    let mut by_label: AHashMap<i64, Vec<usize>> = AHashMap::new();
    for (index, &label) in labels.iter().enumerate() {
        if label == NOISE {
            continue;
        }
        let bucket = by_label.entry(label).or_default();
        if bucket.is_empty() {
            order.push(label);
        }
        bucket.push(index);
    }

    let mut groups: Vec<ClusterGroup> = order
        .into_iter()
        .map(|label| ClusterGroup {
            id: GroupId::Cluster(label),
            indices: by_label.remove(&label).unwrap_or_default(),
        })
        .collect();

    for (index, &label) in labels.iter().enumerate() {
        if label == NOISE {
            groups.push(ClusterGroup {
                id: GroupId::Noise(index),
                indices: vec![index],
            });
        }
    }
    groups
}
