//! Accuracy evaluation: brute-force reference search and recall@k.
//!
//! Recall is measured the way ANN benchmarks report it: for each query, the
//! fraction of the exact top-k ids that the approximate search also returned.

use crate::error::{check_dimension, Result};
use crate::hnsw::distance::DistanceMetric;
use crate::hnsw::graph::HnswIndex;
use crate::item::Item;
use crate::kdtree::KdTree;
use crate::search::types::{by_distance, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ops::AddAssign;

/// Exact k nearest neighbors by scanning every item.
///
/// Ties keep slice order, so this matches [`KdTree::k_nearest`] exactly when
/// `items` is in the tree's insertion order.
pub fn brute_force_knn<K: Clone>(
    items: &[Item<K>],
    query: &[f32],
    k: usize,
    metric: DistanceMetric,
) -> Result<Vec<SearchResult<K>>> {
    let mut scored: Vec<(f32, usize)> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        check_dimension(query.len(), item.vector.len())?;
        scored.push((metric.distance_unchecked(query, &item.vector), i));
    }
    // Stable sort: equal distances stay in insertion order
    scored.sort_by(|a, b| by_distance(a.0, b.0));
    scored.truncate(k);
    Ok(scored
        .into_iter()
        .map(|(distance, i)| SearchResult::new(items[i].id.clone(), distance))
        .collect())
}

/// Matched and expected counts accumulated over one or more queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallReport {
    /// Exact results the approximate search also returned.
    pub matched: usize,
    /// Exact results examined.
    pub total: usize,
}

impl RecallReport {
    /// `matched / total`; a report with nothing to find counts as perfect.
    pub fn recall(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }

    /// Exact results the approximate search missed.
    pub fn missed(&self) -> usize {
        self.total - self.matched
    }
}

impl AddAssign for RecallReport {
    fn add_assign(&mut self, other: Self) {
        self.matched += other.matched;
        self.total += other.total;
    }
}

impl fmt::Display for RecallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (recall {:.4})",
            self.matched,
            self.total,
            self.recall()
        )
    }
}

/// Compare one approximate result list against the exact one.
pub fn recall_at_k<K: Eq + Hash>(
    approximate: &[SearchResult<K>],
    exact: &[SearchResult<K>],
) -> RecallReport {
    let found: HashSet<&K> = approximate.iter().map(|r| &r.id).collect();
    RecallReport {
        matched: exact.iter().filter(|r| found.contains(&r.id)).count(),
        total: exact.len(),
    }
}

/// Recall of `graph` against `tree` over a set of queries, both asked for `k`.
pub fn measure_recall<'q, K, Q>(
    graph: &HnswIndex<K>,
    tree: &KdTree<K>,
    queries: Q,
    k: usize,
) -> Result<RecallReport>
where
    K: Clone + Eq + Hash + fmt::Debug,
    Q: IntoIterator<Item = &'q [f32]>,
{
    let mut report = RecallReport::default();
    for query in queries {
        let approximate = graph.find_nearest(query, k)?;
        let exact = tree.k_nearest(query, k)?;
        report += recall_at_k(&approximate, &exact);
    }
    tracing::debug!(%report, k, "recall measured");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(ids: &[u32]) -> Vec<SearchResult<u32>> {
        ids.iter().map(|&id| SearchResult::new(id, 0.0)).collect()
    }

    #[test]
    fn test_recall_at_k_counts_overlap() {
        let report = recall_at_k(&hits(&[1, 2, 3, 9]), &hits(&[1, 2, 3, 4]));
        assert_eq!(report, RecallReport { matched: 3, total: 4 });
        assert_eq!(report.missed(), 1);
        assert!((report.recall() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_recall_empty_is_perfect() {
        let report = recall_at_k::<u32>(&[], &[]);
        assert_eq!(report.recall(), 1.0);
    }

    #[test]
    fn test_reports_accumulate() {
        let mut total = RecallReport::default();
        total += RecallReport { matched: 2, total: 2 };
        total += RecallReport { matched: 0, total: 2 };
        assert_eq!(total.recall(), 0.5);
        assert_eq!(total.to_string(), "2/4 (recall 0.5000)");
    }

    #[test]
    fn test_brute_force_orders_ties_by_position() {
        let items = vec![
            Item::new('a', vec![2.0]),
            Item::new('b', vec![0.0]),
            Item::new('c', vec![2.0]),
            Item::new('d', vec![1.0]),
        ];
        let got = brute_force_knn(&items, &[1.0], 3, DistanceMetric::Manhattan).unwrap();
        let ids: Vec<char> = got.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!['d', 'a', 'b']);
    }

    #[test]
    fn test_brute_force_dimension_mismatch() {
        let items = vec![Item::new(0u32, vec![1.0, 2.0])];
        assert!(brute_force_knn(&items, &[1.0], 1, DistanceMetric::Euclidean).is_err());
    }
}
