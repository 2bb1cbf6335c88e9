//! Result types returned by both indexes.

use std::cmp::Ordering;

/// An item identifier with its distance to the query.
///
/// Both [`KdTree`](crate::kdtree::KdTree) and
/// [`HnswIndex`](crate::hnsw::HnswIndex) return these in ascending distance order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<K> {
    /// Identifier of the matched item.
    pub id: K,
    /// Distance from the query under the index's metric (lower = closer).
    pub distance: f32,
}

impl<K> SearchResult<K> {
    pub fn new(id: K, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Ascending-by-distance comparator for sorting result lists.
#[inline]
pub(crate) fn by_distance(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
