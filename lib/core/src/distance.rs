//! Structural distance between record signatures
//!
//! The metric is a Jaccard distance over keysets plus a small penalty for
//! shared keypaths whose dominant types disagree. It is symmetric and
//! non-negative but deliberately unclamped: the nominal range is [0, 1.3].

use crate::signature::Signature;
use ahash::AHashSet;
use rayon::prelude::*;

/// Weight of the type-disagreement penalty in the combined distance.
pub const TYPE_PENALTY_WEIGHT: f64 = 0.3;

/// Jaccard distance between two keysets. Two empty sets are identical.
pub fn jaccard_distance(a: &AHashSet<String>, b: &AHashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        1.0 - inter as f64 / union as f64
    }
}

/// Fraction of shared keypaths whose most frequent type differs.
///
/// Only keypaths present in both signatures count; with no overlap the
/// penalty is zero. "Most frequent" ties resolve by insertion order inside
/// [`crate::signature::TypeHistogram`].
pub fn type_penalty(a: &Signature, b: &Signature) -> f64 {
    let mut shared = 0usize;
    let mut mismatches = 0usize;
    for (key, hist_a) in &a.types {
        if let Some(hist_b) = b.types.get(key) {
            shared += 1;
            if hist_a.top() != hist_b.top() {
                mismatches += 1;
            }
        }
    }
    if shared == 0 {
        0.0
    } else {
        mismatches as f64 / shared as f64
    }
}

/// Combined structural distance between two signatures.
pub fn signature_distance(a: &Signature, b: &Signature) -> f64 {
    jaccard_distance(&a.keys, &b.keys) + TYPE_PENALTY_WEIGHT * type_penalty(a, b)
}

/// Symmetric pairwise distance matrix with a zero diagonal.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances.
    ///
    /// Rows are filled in parallel; each cell is an independent pure
    /// computation, so the matrix is symmetric by construction.
    pub fn build(signatures: &[Signature]) -> Self {
        let n = signatures.len();
        let mut data = vec![0.0; n * n];
        data.par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(i, row)| {
                for (j, cell) in row.iter_mut().enumerate() {
                    if i != j {
                        *cell = signature_distance(&signatures[i], &signatures[j]);
                    }
                }
            });
        Self { n, data }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_distance_is_symmetric() {
        let a = Signature::of(&json!({"id": 1, "name": "a"}));
        let b = Signature::of(&json!({"id": "x", "extra": true}));
        assert_eq!(signature_distance(&a, &b), signature_distance(&b, &a));
    }

    #[test]
    fn test_identical_records_at_zero_distance() {
        let a = Signature::of(&json!({"id": 1, "name": "a"}));
        let b = Signature::of(&json!({"id": 2, "name": "b"}));
        assert_eq!(signature_distance(&a, &b), 0.0);
    }

    #[test]
    fn test_self_distance_is_zero() {
        let a = Signature::of(&json!({"id": 1, "tags": ["x", 2]}));
        assert_eq!(signature_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_empty_keysets_are_identical() {
        let a = Signature::of(&json!({}));
        let b = Signature::of(&json!({}));
        assert_eq!(signature_distance(&a, &b), 0.0);
    }

    #[test]
    fn test_disjoint_keysets_at_full_jaccard() {
        let a = Signature::of(&json!({"x": 1}));
        let b = Signature::of(&json!({"y": 2}));
        // no shared keys, so no type penalty either
        assert_eq!(signature_distance(&a, &b), 1.0);
    }

    #[test]
    fn test_type_disagreement_adds_penalty() {
        let a = Signature::of(&json!({"id": 1}));
        let b = Signature::of(&json!({"id": "one"}));
        // same keyset, one shared key with differing dominant type
        let d = signature_distance(&a, &b);
        assert!((d - TYPE_PENALTY_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_distance_can_exceed_one() {
        let a = Signature::of(&json!({"id": 1, "only_a": 1}));
        let b = Signature::of(&json!({"id": "one", "only_b": 1}));
        assert!(signature_distance(&a, &b) > 1.0);
    }

    #[test]
    fn test_matrix_diagonal_and_symmetry() {
        let sigs: Vec<Signature> = [
            json!({"id": 1, "name": "a"}),
            json!({"id": 2, "name": "b"}),
            json!({"totally": "different", "shape": true}),
        ]
        .iter()
        .map(Signature::of)
        .collect();

        let m = DistanceMatrix::build(&sigs);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert!(m.get(0, 1) < m.get(0, 2));
    }

    #[test]
    fn test_empty_matrix() {
        let m = DistanceMatrix::build(&[]);
        assert!(m.is_empty());
    }
}
