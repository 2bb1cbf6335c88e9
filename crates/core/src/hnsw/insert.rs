//! HNSW insertion algorithm.
//!
//! Inserts an item into the HNSW graph with bidirectional connections and
//! heuristic neighbor pruning (Algorithm 4 from the HNSW paper).
//!
//! Pruning alone can cut a node's last incoming layer-0 edge. Each node is
//! therefore also attached to a spanning tree over layer 0 whose edges are
//! kept in both directions and never pruned.

use crate::config;
use crate::error::{check_dimension, IndexError, Result};
use crate::hnsw::graph::HnswIndex;
use crate::hnsw::search::{greedy_descent, search_layer};
use crate::item::Item;
use crate::search::types::by_distance;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

impl<K> HnswIndex<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Insert a new item into the HNSW index.
    ///
    /// Fails before touching the graph if the vector has the wrong length or
    /// the id is already present. Otherwise the item is linked on every layer
    /// from 0 up to its randomly drawn top layer.
    pub fn insert(&mut self, item: Item<K>) -> Result<()> {
        check_dimension(self.dimension, item.vector.len())?;
        if self.id_to_node.contains_key(&item.id) {
            return Err(IndexError::DuplicateId(format!("{:?}", item.id)));
        }
        if self.ids.len() >= config::MAX_ITEMS {
            return Err(IndexError::CapacityExceeded(config::MAX_ITEMS));
        }

        let level = self.random_level();
        let Item { id, vector } = item;

        // First node: becomes the entry point with empty neighbor lists
        let Some(entry_point) = self.entry_point else {
            let node = self.push_node(id, &vector, level, vec![Vec::new(); level + 1], None);
            self.entry_point = Some(node);
            self.max_layer = level;
            tracing::trace!(node, level, "inserted first node");
            return Ok(());
        };

        // Phase 1: greedy descent through the layers above the new node's top layer
        let current_ep = greedy_descent(self, &vector, entry_point, self.max_layer, level);

        // Phase 2: search each layer and pick neighbors for the new node.
        // The node is not in the arena yet, so it never shows up as its own candidate.
        let top = level.min(self.max_layer);
        let mut node_neighbors: Vec<Vec<u32>> = vec![Vec::new(); level + 1];
        let mut visited = std::mem::take(&mut self.build_visited);
        let mut layer_eps: Vec<u32> = vec![current_ep];
        for layer in (0..=top).rev() {
            let candidates = search_layer(
                self,
                &vector,
                &layer_eps,
                self.config.ef_construction,
                layer,
                &mut visited,
            );

            let selected = select_neighbors_heuristic(self, &candidates, self.config.m);
            node_neighbors[layer] = selected.iter().map(|&(_, n)| n).collect();

            // Every candidate of this layer seeds the search one layer down
            layer_eps.clear();
            layer_eps.extend(candidates.iter().map(|&(_, n)| n));
            if layer_eps.is_empty() {
                layer_eps.push(entry_point);
            }
        }
        self.build_visited = visited;

        // After the loop `layer_eps` holds the layer-0 candidates, closest first
        let parent = self.tree_parent_for(&layer_eps).unwrap_or(entry_point);
        let base_links = &mut node_neighbors[0];
        if !base_links.contains(&parent) {
            if base_links.len() >= self.config.m_max0 {
                base_links.pop();
            }
            base_links.push(parent);
        }

        let node = self.push_node(id, &vector, level, node_neighbors, Some(parent));

        // Phase 3: add reverse edges and prune neighbors that went over capacity
        for layer in 0..=top {
            let cap = self.config.max_degree(layer);
            let linked: Vec<u32> = self.neighbors[node as usize][layer].clone();
            for neighbor in linked {
                let nid = neighbor as usize;
                self.neighbors[nid][layer].push(node);
                if self.neighbors[nid][layer].len() > cap {
                    self.prune_links(neighbor, layer, cap);
                }
            }
        }

        // Update entry point if the new node has a higher layer
        if level > self.max_layer {
            tracing::debug!(
                node,
                level,
                previous = self.max_layer,
                "new entry point"
            );
            self.max_layer = level;
            self.entry_point = Some(node);
        }
        tracing::trace!(node, level, "inserted node");
        Ok(())
    }

    /// Insert every item in order, reporting `(done, total)` to `progress`
    /// every [`HNSW_PROGRESS_INTERVAL`](config::HNSW_PROGRESS_INTERVAL) items and
    /// once at the end.
    ///
    /// Stops at the first rejected item and returns its error; items inserted
    /// before it stay in the index.
    pub fn add_all<I, F>(&mut self, items: I, mut progress: F) -> Result<()>
    where
        I: IntoIterator<Item = Item<K>>,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(usize, usize),
    {
        let items = items.into_iter();
        let total = items.len();
        let started = Instant::now();
        self.reserve(total);

        for (i, item) in items.enumerate() {
            self.insert(item)?;
            let done = i + 1;
            if done % config::HNSW_PROGRESS_INTERVAL == 0 && done < total {
                progress(done, total);
            }
        }
        progress(total, total);

        tracing::info!(
            items = total,
            size = self.len(),
            max_layer = self.max_layer,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "hnsw bulk insert complete"
        );
        Ok(())
    }

    /// Reserve arena space for `additional` more items.
    pub fn reserve(&mut self, additional: usize) {
        self.vectors
            .reserve(additional.saturating_mul(self.dimension));
        self.ids.reserve(additional);
        self.neighbors.reserve(additional);
        self.layers.reserve(additional);
        self.tree_parent.reserve(additional);
        self.tree_degree.reserve(additional);
        self.id_to_node.reserve(additional);
    }
}

impl<K> HnswIndex<K> {
    /// Picks the layer-0 tree parent for a new node: the closest candidate with
    /// fewer than M tree edges, else the newest such node in the graph.
    ///
    /// A tree always has a leaf, and a leaf has one tree edge, so with M >= 2
    /// the fallback scan finds a parent in any non-empty graph.
    fn tree_parent_for(&self, candidates: &[u32]) -> Option<u32> {
        let limit = self.config.m as u32;
        candidates
            .iter()
            .copied()
            .find(|&c| self.tree_degree[c as usize] < limit)
            .or_else(|| {
                (0..self.ids.len() as u32)
                    .rev()
                    .find(|&n| self.tree_degree[n as usize] < limit)
            })
    }

    /// Shrinks `node`'s list on `layer` to `cap` with the diversity heuristic.
    /// Layer-0 tree edges are always kept; at most M of them exist per node,
    /// so they fit under the layer-0 cap.
    fn prune_links(&mut self, node: u32, layer: usize, cap: usize) {
        let links = &self.neighbors[node as usize][layer];
        let (mut kept, free): (Vec<u32>, Vec<u32>) = if layer == 0 {
            links.iter().copied().partition(|&n| self.is_tree_edge(node, n))
        } else {
            (Vec::new(), links.clone())
        };
        let candidates: Vec<(f32, u32)> = free
            .iter()
            .map(|&c| (self.node_distance(node, c), c))
            .collect();
        let selected =
            select_neighbors_heuristic(self, &candidates, cap.saturating_sub(kept.len()));
        kept.extend(selected.iter().map(|&(_, n)| n));
        self.neighbors[node as usize][layer] = kept;
    }
}

/// Heuristic neighbor selection (Algorithm 4 from the HNSW paper).
///
/// Candidates are visited closest first. A candidate is kept only if it is at
/// least as close to the base node as to every neighbor already kept, so a
/// tight cluster contributes one edge instead of many. If fewer than `m`
/// survive, the closest rejected candidates fill the remaining slots.
pub fn select_neighbors_heuristic<K>(
    index: &HnswIndex<K>,
    candidates: &[(f32, u32)],
    m: usize,
) -> Vec<(f32, u32)> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| by_distance(a.0, b.0));

    let mut selected: Vec<(f32, u32)> = Vec::with_capacity(m);
    let mut rejected: Vec<(f32, u32)> = Vec::new();

    for &(dist_to_base, cid) in &sorted {
        if selected.len() >= m {
            break;
        }
        let is_diverse = selected
            .iter()
            .all(|&(_, sid)| dist_to_base <= index.node_distance(cid, sid));
        if is_diverse {
            selected.push((dist_to_base, cid));
        } else {
            rejected.push((dist_to_base, cid));
        }
    }

    // Rejected entries are already in ascending order
    for candidate in rejected {
        if selected.len() >= m {
            break;
        }
        selected.push(candidate);
    }

    selected
}
