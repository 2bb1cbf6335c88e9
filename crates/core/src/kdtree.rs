//! Exact k-d tree for k-nearest-neighbor queries.
//!
//! Items are inserted one at a time without rebalancing, so the tree shape
//! follows insertion order: random order gives O(log n) depth, sorted input
//! degrades to a linked list. Nodes live in an arena owned by the tree and
//! link to their children by handle, which keeps insertion, search, and drop
//! iterative however deep the tree gets.
//!
//! Queries return exactly the k closest items. Equal distances are ordered by
//! insertion order, first inserted first.

use crate::config;
use crate::error::{check_dimension, check_index_dimension, IndexError, Result};
use crate::hnsw::distance::DistanceMetric;
use crate::item::Item;
use crate::search::types::SearchResult;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;
use std::time::Instant;

#[derive(Debug)]
struct KdNode<K> {
    item: Item<K>,
    /// Coordinate compared at this node: `depth % dimension`.
    axis: usize,
    /// Items with `coord[axis] < pivot[axis]`.
    left: Option<u32>,
    /// Items with `coord[axis] >= pivot[axis]`.
    right: Option<u32>,
}

/// One of the current k best: ordered by distance, then insertion sequence.
/// The max-heap top is the worst kept candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Best {
    distance: OrderedFloat<f32>,
    seq: u32,
}

/// Exact k-d tree over labeled vectors.
#[derive(Debug)]
pub struct KdTree<K> {
    // Arena in insertion order; a node's handle doubles as its insertion sequence
    nodes: Vec<KdNode<K>>,
    dimension: usize,
    metric: DistanceMetric,
    height: usize,
}

impl<K: Clone> KdTree<K> {
    /// Creates an empty tree for vectors of `dimension` coordinates.
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        check_index_dimension(dimension)?;
        Ok(Self {
            nodes: Vec::new(),
            dimension,
            metric,
            height: 0,
        })
    }

    /// Builds a tree by inserting `items` in the given order.
    pub fn from_items<I>(dimension: usize, metric: DistanceMetric, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = Item<K>>,
    {
        let mut tree = Self::new(dimension, metric)?;
        tree.bulk_build(items)?;
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of levels on the longest root-to-leaf path (0 when empty).
    pub fn depth(&self) -> usize {
        self.height
    }

    /// Stored items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Item<K>> + '_ {
        self.nodes.iter().map(|node| &node.item)
    }

    /// Adds one item. The first item becomes the root.
    pub fn insert(&mut self, item: Item<K>) -> Result<()> {
        check_dimension(self.dimension, item.vector.len())?;
        if self.nodes.len() >= config::MAX_ITEMS {
            return Err(IndexError::CapacityExceeded(config::MAX_ITEMS));
        }
        let handle = self.nodes.len() as u32;

        if self.nodes.is_empty() {
            self.nodes.push(KdNode {
                item,
                axis: 0,
                left: None,
                right: None,
            });
            self.height = 1;
            return Ok(());
        }

        let mut current = 0usize;
        let mut depth = 0usize;
        loop {
            let node = &self.nodes[current];
            let go_left = item.vector[node.axis] < node.item.vector[node.axis];
            let child = if go_left { node.left } else { node.right };
            match child {
                Some(next) => {
                    current = next as usize;
                    depth += 1;
                }
                None => {
                    let node = &mut self.nodes[current];
                    if go_left {
                        node.left = Some(handle);
                    } else {
                        node.right = Some(handle);
                    }
                    break;
                }
            }
        }

        let child_depth = depth + 1;
        self.nodes.push(KdNode {
            item,
            axis: child_depth % self.dimension,
            left: None,
            right: None,
        });
        self.height = self.height.max(child_depth + 1);
        Ok(())
    }

    /// Inserts `items` one at a time in the order given; no median balancing.
    ///
    /// Stops at the first rejected item; earlier items stay in the tree.
    pub fn bulk_build<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Item<K>>,
    {
        let started = Instant::now();
        let before = self.len();
        for item in items {
            self.insert(item)?;
        }
        tracing::info!(
            items = self.len() - before,
            size = self.len(),
            depth = self.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "kd-tree build complete"
        );
        Ok(())
    }

    /// The `k` items closest to `query`, ascending by distance.
    ///
    /// Returns every item when the tree holds fewer than `k`, and nothing when
    /// `k` is zero or the tree is empty.
    pub fn k_nearest(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult<K>>> {
        check_dimension(self.dimension, query.len())?;
        if k == 0 || self.nodes.is_empty() {
            return Ok(Vec::new());
        }

        let k = k.min(self.nodes.len());
        let mut best: BinaryHeap<Best> = BinaryHeap::with_capacity(k + 1);
        // (node, lower bound on the distance of anything in its subtree)
        let mut stack: Vec<(u32, f32)> = vec![(0, 0.0)];

        while let Some((handle, bound)) = stack.pop() {
            if best.len() == k {
                if let Some(worst) = best.peek() {
                    // Equal bounds are still explored: an earlier item at the
                    // same distance outranks the current worst.
                    if bound > worst.distance.0 {
                        continue;
                    }
                }
            }

            let node = &self.nodes[handle as usize];
            let entry = Best {
                distance: OrderedFloat(self.metric.distance_unchecked(query, &node.item.vector)),
                seq: handle,
            };
            if best.len() < k {
                best.push(entry);
            } else if best.peek().is_some_and(|worst| entry < *worst) {
                best.pop();
                best.push(entry);
            }

            let diff = query[node.axis] - node.item.vector[node.axis];
            let (near, far) = if diff < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            // Pushed first so the near side is explored first
            if let Some(far) = far {
                let far_bound = bound.max(self.metric.axis_lower_bound(diff));
                stack.push((far, far_bound));
            }
            if let Some(near) = near {
                stack.push((near, bound));
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|b| {
                let item = &self.nodes[b.seq as usize].item;
                SearchResult::new(item.id.clone(), b.distance.0)
            })
            .collect())
    }
}
