//! Distance metric implementations shared by the HNSW graph and the k-d tree.
//!
//! Supports two true metrics: Manhattan (L1) and Euclidean (L2). Both are
//! symmetric, satisfy the triangle inequality, and are zero only for equal
//! vectors, which the k-d tree relies on for its pruning bound.

use crate::error::{check_dimension, Result};

/// Distance metric used for vector comparison.
///
/// All metrics return a distance value where **lower is closer**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DistanceMetric {
    /// Sum of absolute coordinate differences. Range: \[0, ∞).
    Manhattan,
    /// Square root of the sum of squared differences. Range: \[0, ∞).
    Euclidean,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length.
    ///
    /// Fails with [`IndexError::DimensionMismatch`](crate::IndexError::DimensionMismatch)
    /// when the lengths differ.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimension(a.len(), b.len())?;
        Ok(self.distance_unchecked(a, b))
    }

    /// Distance without the length check. Used in the inner loops once an
    /// index has validated the vector at its boundary.
    #[inline]
    pub fn distance_unchecked(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceMetric::Manhattan => manhattan_f32(a, b),
            DistanceMetric::Euclidean => euclidean_sq_f32(a, b).sqrt(),
        }
    }

    /// Lower bound on the full distance between two points whose coordinates
    /// differ by `diff` along one axis.
    #[inline]
    pub fn axis_lower_bound(&self, diff: f32) -> f32 {
        match self {
            DistanceMetric::Manhattan | DistanceMetric::Euclidean => diff.abs(),
        }
    }
}

/// L1 distance, 4-wide unrolled so the compiler can vectorize it.
#[inline]
fn manhattan_f32(a: &[f32], b: &[f32]) -> f32 {
    let chunks = a.len() / 4;
    let mut acc = [0.0f32; 4];
    for i in 0..chunks {
        let base = i * 4;
        for lane in 0..4 {
            acc[lane] += (a[base + lane] - b[base + lane]).abs();
        }
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for i in chunks * 4..a.len() {
        sum += (a[i] - b[i]).abs();
    }
    sum
}

/// Squared L2 distance, unrolled like [`manhattan_f32`].
#[inline]
fn euclidean_sq_f32(a: &[f32], b: &[f32]) -> f32 {
    let chunks = a.len() / 4;
    let mut acc = [0.0f32; 4];
    for i in 0..chunks {
        let base = i * 4;
        for lane in 0..4 {
            let d = a[base + lane] - b[base + lane];
            acc[lane] += d * d;
        }
    }
    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for i in chunks * 4..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexError;
    use proptest::prelude::*;

    #[test]
    fn test_manhattan_distance() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![3.0, -4.0, 1.0];
        let d = DistanceMetric::Manhattan.distance(&a, &b).unwrap();
        assert!((d - 8.0).abs() < 1e-6, "manhattan should be 8, got {d}");
    }

    #[test]
    fn test_euclidean_distance() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![3.0, 4.0, 0.0];
        let d = DistanceMetric::Euclidean.distance(&a, &b).unwrap();
        assert!((d - 5.0).abs() < 1e-6, "euclidean should be 5, got {d}");
    }

    #[test]
    fn test_unrolled_tail_is_counted() {
        // 7 coordinates: one full chunk of 4 plus a tail of 3
        let a = vec![1.0; 7];
        let b = vec![0.0; 7];
        assert_eq!(DistanceMetric::Manhattan.distance_unchecked(&a, &b), 7.0);
        let d = DistanceMetric::Euclidean.distance_unchecked(&a, &b);
        assert!((d - 7.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = DistanceMetric::Euclidean
            .distance(&[1.0, 2.0], &[1.0, 2.0, 3.0])
            .unwrap_err();
        assert_eq!(err, IndexError::DimensionMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn test_axis_lower_bound() {
        assert_eq!(DistanceMetric::Manhattan.axis_lower_bound(-2.5), 2.5);
        assert_eq!(DistanceMetric::Euclidean.axis_lower_bound(1.5), 1.5);
    }

    #[test]
    fn test_metric_serde_names() {
        let json = serde_json::to_string(&DistanceMetric::Manhattan).unwrap();
        assert_eq!(json, "\"Manhattan\"");
        let m: DistanceMetric = serde_json::from_str("\"Euclidean\"").unwrap();
        assert_eq!(m, DistanceMetric::Euclidean);
    }

    fn pair(dim: usize) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
        (
            prop::collection::vec(-100.0f32..100.0, dim),
            prop::collection::vec(-100.0f32..100.0, dim),
        )
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_zero_on_self((a, b) in (1usize..24).prop_flat_map(pair)) {
            for metric in [DistanceMetric::Manhattan, DistanceMetric::Euclidean] {
                let ab = metric.distance(&a, &b).unwrap();
                let ba = metric.distance(&b, &a).unwrap();
                prop_assert_eq!(ab, ba);
                prop_assert!(ab >= 0.0);
                prop_assert_eq!(metric.distance(&a, &a).unwrap(), 0.0);
            }
        }

        #[test]
        fn prop_axis_bound_never_exceeds_distance((a, b) in (1usize..24).prop_flat_map(pair)) {
            for metric in [DistanceMetric::Manhattan, DistanceMetric::Euclidean] {
                let full = metric.distance(&a, &b).unwrap();
                for axis in 0..a.len() {
                    prop_assert!(metric.axis_lower_bound(a[axis] - b[axis]) <= full);
                }
            }
        }
    }
}
