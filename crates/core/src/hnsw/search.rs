//! HNSW search algorithms: greedy descent, single-layer best-first search, and
//! multi-layer KNN.
//!
//! Upper layers are crossed by greedy hill-climbing toward the query; layer 0
//! is searched with a bounded candidate list of size `ef`.

use crate::error::{check_dimension, Result};
use crate::hnsw::graph::HnswIndex;
use crate::hnsw::visited::VisitedSet;
use crate::search::types::{by_distance, SearchResult};
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::hash::Hash;

/// Upper bound on heap pre-allocation; larger ef values grow the heaps on demand.
const HEAP_RESERVE_LIMIT: usize = 4096;

thread_local! {
    /// Thread-local VisitedSet pool for search operations.
    /// Reused across queries on the same thread instead of allocating per query.
    static SEARCH_VISITED: RefCell<VisitedSet> = RefCell::new(VisitedSet::new(0));
}

/// A candidate during search: (negative distance, handle).
/// BinaryHeap is a max-heap; we use negative distance for min-heap behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    neg_distance: OrderedFloat<f32>,
    node: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.neg_distance.cmp(&other.neg_distance)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A result entry: (distance, handle). Max-heap by distance for pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultEntry {
    distance: OrderedFloat<f32>,
    node: u32,
}

impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance.cmp(&other.distance)
    }
}

impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn query_distance<K>(index: &HnswIndex<K>, query: &[f32], node: u32) -> f32 {
    index
        .config
        .distance_metric
        .distance_unchecked(query, index.vector(node))
}

/// Greedy descent from `entry` at `top_layer` down to (but not into) `floor_layer`.
///
/// On each layer the walk moves to whichever neighbor is closer than the current
/// node until no neighbor improves, then drops one layer. Returns the node
/// reached on layer `floor_layer + 1`, or `entry` if `top_layer <= floor_layer`.
pub fn greedy_descent<K>(
    index: &HnswIndex<K>,
    query: &[f32],
    entry: u32,
    top_layer: usize,
    floor_layer: usize,
) -> u32 {
    let mut current = entry;
    let mut current_dist = query_distance(index, query, current);
    let mut layer = top_layer;

    while layer > floor_layer {
        let mut improved = false;
        for &neighbor in index.neighbors_of(current, layer) {
            let dist = query_distance(index, query, neighbor);
            if dist < current_dist {
                current = neighbor;
                current_dist = dist;
                improved = true;
            }
        }
        if !improved {
            layer -= 1;
        }
    }
    current
}

/// Search a single layer of the HNSW graph.
///
/// Returns up to `ef` nodes closest to `query` at `layer`, ascending by distance.
/// `visited` is reset at the start of each call and grown to the graph size.
pub fn search_layer<K>(
    index: &HnswIndex<K>,
    query: &[f32],
    entry_points: &[u32],
    ef: usize,
    layer: usize,
    visited: &mut VisitedSet,
) -> Vec<(f32, u32)> {
    visited.grow_to(index.ids.len());
    visited.reset();
    let reserve = ef.min(HEAP_RESERVE_LIMIT);
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(reserve * 2);
    let mut results: BinaryHeap<ResultEntry> = BinaryHeap::with_capacity(reserve + 1);
    // Cached worst distance, avoids repeated heap peeks in the hot loop
    let mut worst_dist = f32::MAX;

    for &ep in entry_points {
        if !visited.visit(ep) {
            continue;
        }
        let dist = query_distance(index, query, ep);
        candidates.push(Candidate {
            neg_distance: OrderedFloat(-dist),
            node: ep,
        });
        results.push(ResultEntry {
            distance: OrderedFloat(dist),
            node: ep,
        });
        if results.len() > ef {
            results.pop();
        }
        if results.len() >= ef {
            worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
        }
    }

    while let Some(candidate) = candidates.pop() {
        let c_dist = -candidate.neg_distance.0;

        // The closest unexpanded candidate is farther than the worst result
        if results.len() >= ef && c_dist > worst_dist {
            break;
        }

        for &neighbor in index.neighbors_of(candidate.node, layer) {
            if !visited.visit(neighbor) {
                continue;
            }

            let dist = query_distance(index, query, neighbor);
            if results.len() < ef || dist < worst_dist {
                candidates.push(Candidate {
                    neg_distance: OrderedFloat(-dist),
                    node: neighbor,
                });
                results.push(ResultEntry {
                    distance: OrderedFloat(dist),
                    node: neighbor,
                });
                if results.len() > ef {
                    results.pop(); // remove worst
                }
                if results.len() >= ef {
                    worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
                }
            }
        }
    }

    results
        .into_sorted_vec()
        .into_iter()
        .map(|r| (r.distance.0, r.node))
        .collect()
}

/// Multi-layer KNN search through the HNSW graph.
///
/// Descends greedily to layer 1, then searches layer 0 with a candidate list of
/// `max(ef, k)`. Returns up to `k` `(distance, handle)` pairs, ascending.
pub fn knn_search<K>(
    index: &HnswIndex<K>,
    query: &[f32],
    k: usize,
    ef: usize,
) -> Vec<(f32, u32)> {
    let entry_point = match index.entry_point {
        Some(ep) if k > 0 => ep,
        _ => return Vec::new(),
    };

    let current_ep = greedy_descent(index, query, entry_point, index.max_layer, 0);

    SEARCH_VISITED.with(|cell| {
        let mut visited = cell.borrow_mut();
        let mut results = search_layer(
            index,
            query,
            std::slice::from_ref(&current_ep),
            ef.max(k),
            0,
            &mut *visited,
        );
        results.truncate(k);
        results
    })
}

impl<K> HnswIndex<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Approximate k nearest neighbors of `query`, ascending by distance,
    /// using the configured `ef_search`.
    ///
    /// An empty index returns an empty list.
    pub fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult<K>>> {
        self.find_nearest_with_ef(query, k, self.config.ef_search)
    }

    /// Like [`find_nearest`](Self::find_nearest) with a per-query candidate list size.
    pub fn find_nearest_with_ef(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<Vec<SearchResult<K>>> {
        check_dimension(self.dimension, query.len())?;
        Ok(self.to_results(knn_search(self, query, k, ef)))
    }

    /// The k nearest neighbors of a stored item, excluding the item itself.
    /// Returns an empty list if `id` is not in the index.
    pub fn find_neighbors(&self, id: &K, k: usize) -> Vec<SearchResult<K>> {
        let Some(&node) = self.id_to_node.get(id) else {
            return Vec::new();
        };
        let query = self.vector(node);
        let mut hits = knn_search(self, query, k.saturating_add(1), self.config.ef_search);
        hits.retain(|&(_, n)| n != node);
        hits.truncate(k);
        self.to_results(hits)
    }

    fn to_results(&self, mut hits: Vec<(f32, u32)>) -> Vec<SearchResult<K>> {
        hits.sort_by(|a, b| by_distance(a.0, b.0));
        hits.into_iter()
            .map(|(distance, node)| SearchResult::new(self.node_id(node).clone(), distance))
            .collect()
    }
}
