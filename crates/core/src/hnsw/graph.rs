//! HNSW graph structure and configuration.
//!
//! [`HnswConfig`] defines tuning parameters (M, ef_construction, ef_search, distance metric).
//! [`HnswIndex`] stores the graph using Struct-of-Arrays layout for cache efficiency.

use crate::config;
use crate::error::{check_index_dimension, IndexError, Result};
use crate::hnsw::distance::DistanceMetric;
use crate::hnsw::visited::VisitedSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Tree parent of the first inserted node.
pub(crate) const NO_PARENT: u32 = u32::MAX;

/// Configuration parameters for an HNSW index.
///
/// Controls the trade-off between build speed, search speed, recall, and memory usage.
/// Missing fields fall back to [`HnswConfig::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Number of bidirectional links per node (except layer 0, which uses `m_max0`).
    pub m: usize,
    /// Maximum links per node at layer 0 (typically `2 * m`).
    pub m_max0: usize,
    /// Candidate list size during index construction.
    pub ef_construction: usize,
    /// Candidate list size during search (higher = better recall, slower).
    pub ef_search: usize,
    /// Maximum number of layers in the graph.
    pub max_layers: usize,
    /// Distance function for similarity computation.
    pub distance_metric: DistanceMetric,
    /// Seed for the layer-assignment RNG. Same seed and insert order give the same graph.
    pub seed: u64,
}

impl HnswConfig {
    /// Configuration with the given M; `m_max0` is `2 * m` and the rest use defaults.
    #[must_use]
    pub fn new(m: usize) -> Self {
        Self {
            m,
            m_max0: m.saturating_mul(2),
            ef_construction: config::HNSW_DEFAULT_EF_CONSTRUCTION,
            ef_search: config::HNSW_DEFAULT_EF_SEARCH,
            max_layers: config::HNSW_DEFAULT_MAX_LAYERS,
            distance_metric: DistanceMetric::Euclidean,
            seed: config::HNSW_DEFAULT_SEED,
        }
    }

    #[must_use]
    pub const fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    #[must_use]
    pub const fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    #[must_use]
    pub const fn with_m_max0(mut self, m_max0: usize) -> Self {
        self.m_max0 = m_max0;
        self
    }

    #[must_use]
    pub const fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    #[must_use]
    pub const fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Level multiplier `1 / ln(M)` for the exponential layer distribution.
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.m as f64).ln()
    }

    /// Maximum degree allowed on `layer`.
    #[inline]
    pub fn max_degree(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0
        } else {
            self.m
        }
    }

    /// Rejects parameter combinations the graph cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.m < config::HNSW_MIN_M {
            return Err(IndexError::InvalidConfiguration(format!(
                "m must be at least {}, got {}",
                config::HNSW_MIN_M,
                self.m
            )));
        }
        if self.m_max0 < self.m {
            return Err(IndexError::InvalidConfiguration(format!(
                "m_max0 ({}) must be >= m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidConfiguration(
                "ef_construction must be positive".to_string(),
            ));
        }
        if self.ef_search == 0 {
            return Err(IndexError::InvalidConfiguration(
                "ef_search must be positive".to_string(),
            ));
        }
        if self.max_layers == 0 || self.max_layers > config::HNSW_MAX_LAYERS_LIMIT {
            return Err(IndexError::InvalidConfiguration(format!(
                "max_layers must be in 1..={}, got {}",
                config::HNSW_MAX_LAYERS_LIMIT,
                self.max_layers
            )));
        }
        Ok(())
    }
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self::new(config::HNSW_DEFAULT_M)
    }
}

/// HNSW Index using Struct-of-Arrays (SoA) layout for cache-friendly access.
///
/// Nodes are addressed by dense `u32` handles in insertion order. Vector data is
/// stored contiguously in one arena; neighbor lists hold handles, never references,
/// so the bidirectional edges form no ownership cycles.
#[derive(Debug)]
pub struct HnswIndex<K> {
    pub(crate) config: HnswConfig,
    // SoA: raw f32 vector arena, `dimension` floats per node
    pub(crate) vectors: Vec<f32>,
    pub(crate) ids: Vec<K>,
    // SoA: graph structure
    pub(crate) neighbors: Vec<Vec<Vec<u32>>>, // [node][layer][neighbor handles]
    pub(crate) layers: Vec<u8>,
    // Layer-0 spanning tree: each node's tree parent (NO_PARENT for the first
    // node) and its count of tree edges. Tree edges are kept in both directions
    // and never pruned, so layer 0 stays connected.
    pub(crate) tree_parent: Vec<u32>,
    pub(crate) tree_degree: Vec<u32>,
    pub(crate) id_to_node: HashMap<K, u32>,
    // Index metadata
    pub(crate) entry_point: Option<u32>,
    pub(crate) max_layer: usize,
    pub(crate) dimension: usize,
    pub(crate) max_item_count: usize,
    pub(crate) rng: StdRng,
    pub(crate) build_visited: VisitedSet,
}

impl<K> HnswIndex<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Creates an empty index.
    ///
    /// `max_item_count` is a capacity hint: storage for up to that many items is
    /// reserved up front (bounded by [`HNSW_PREALLOC_FLOATS`](config::HNSW_PREALLOC_FLOATS)),
    /// and the index grows past it if needed.
    pub fn new(dimension: usize, max_item_count: usize, config: HnswConfig) -> Result<Self> {
        check_index_dimension(dimension)?;
        config.validate()?;
        let reserve = max_item_count
            .min(config::MAX_ITEMS)
            .min(config::HNSW_PREALLOC_FLOATS / dimension);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            vectors: Vec::with_capacity(reserve.saturating_mul(dimension)),
            ids: Vec::with_capacity(reserve),
            neighbors: Vec::with_capacity(reserve),
            layers: Vec::with_capacity(reserve),
            tree_parent: Vec::with_capacity(reserve),
            tree_degree: Vec::with_capacity(reserve),
            id_to_node: HashMap::with_capacity(reserve),
            entry_point: None,
            max_layer: 0,
            dimension,
            max_item_count,
            rng,
            build_visited: VisitedSet::new(reserve),
        })
    }

    /// Creates an empty index with default configuration (Euclidean, M=16, ef_c=200).
    pub fn with_default_config(dimension: usize) -> Result<Self> {
        Self::new(dimension, 0, HnswConfig::default())
    }

    /// Returns `true` if an item with this id was inserted.
    pub fn contains(&self, id: &K) -> bool {
        self.id_to_node.contains_key(id)
    }

    /// Stored vector of the item with this id.
    pub fn get(&self, id: &K) -> Option<&[f32]> {
        self.id_to_node.get(id).map(|&node| self.vector(node))
    }

    /// Append a node's SoA fields and hang it under `parent` in the layer-0
    /// tree. Returns its handle.
    pub(crate) fn push_node(
        &mut self,
        id: K,
        vector: &[f32],
        level: usize,
        links: Vec<Vec<u32>>,
        parent: Option<u32>,
    ) -> u32 {
        debug_assert_eq!(links.len(), level + 1);
        let node = self.ids.len() as u32;
        self.vectors.extend_from_slice(vector);
        self.id_to_node.insert(id.clone(), node);
        self.ids.push(id);
        self.neighbors.push(links);
        self.layers.push(level as u8);
        match parent {
            Some(p) => {
                self.tree_parent.push(p);
                self.tree_degree.push(1);
                self.tree_degree[p as usize] += 1;
            }
            None => {
                self.tree_parent.push(NO_PARENT);
                self.tree_degree.push(0);
            }
        }
        node
    }
}

impl<K> HnswIndex<K> {
    /// Returns the number of items in the index.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    pub fn max_item_count(&self) -> usize {
        self.max_item_count
    }

    /// Candidate list size used by [`find_nearest`](Self::find_nearest).
    pub fn ef(&self) -> usize {
        self.config.ef_search
    }

    /// Changes the default query ef. Zero is rejected.
    pub fn set_ef(&mut self, ef: usize) -> Result<()> {
        if ef == 0 {
            return Err(IndexError::InvalidConfiguration(
                "ef_search must be positive".to_string(),
            ));
        }
        self.config.ef_search = ef;
        Ok(())
    }

    /// Handle of the node every search starts from, if any item was inserted.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    /// Highest layer currently present in the graph.
    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    /// Vector of the node with the given handle. O(1) slice into the arena.
    #[inline]
    pub fn vector(&self, node: u32) -> &[f32] {
        let start = node as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Identifier of the node with the given handle.
    #[inline]
    pub fn node_id(&self, node: u32) -> &K {
        &self.ids[node as usize]
    }

    /// Top layer assigned to the node.
    #[inline]
    pub fn node_layer(&self, node: u32) -> usize {
        self.layers[node as usize] as usize
    }

    /// Neighbor handles of `node` on `layer`; empty above the node's top layer.
    #[inline]
    pub fn neighbors_of(&self, node: u32, layer: usize) -> &[u32] {
        self.neighbors[node as usize]
            .get(layer)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Edge count of `node` on each of its layers, layer 0 first.
    pub fn layer_degrees(&self, node: u32) -> Vec<usize> {
        self.neighbors[node as usize].iter().map(Vec::len).collect()
    }

    /// `true` if `a -> b` is one direction of a layer-0 tree edge.
    #[inline]
    pub(crate) fn is_tree_edge(&self, a: u32, b: u32) -> bool {
        self.tree_parent[a as usize] == b || self.tree_parent[b as usize] == a
    }

    /// Distance between two stored nodes.
    #[inline]
    pub(crate) fn node_distance(&self, a: u32, b: u32) -> f32 {
        self.config
            .distance_metric
            .distance_unchecked(self.vector(a), self.vector(b))
    }

    /// Generate a random layer for a new node using exponential distribution.
    pub(crate) fn random_level(&mut self) -> usize {
        let ml = self.config.level_multiplier();
        // gen() yields [0, 1); flip it so ln() never sees zero
        let r: f64 = 1.0 - self.rng.gen::<f64>();
        let level = (-r.ln() * ml).floor() as usize;
        level.min(self.config.max_layers - 1)
    }
}
