//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor index.
//!
//! Vectors are kept as raw f32 in a contiguous arena and every distance is exact
//! under the configured metric; the approximation comes only from the graph walk.
//!
//! The graph uses a Struct-of-Arrays (SoA) layout for cache-friendly access:
//! vector data, identifiers, neighbor lists, and layer assignments live in
//! separate arrays indexed by the same `u32` node handle.

/// Distance metrics: Manhattan and Euclidean.
pub mod distance;
/// HNSW graph structure, configuration, and data storage.
pub mod graph;
/// HNSW insertion algorithm with bidirectional connections and heuristic pruning.
pub mod insert;
/// HNSW search: greedy descent, single-layer search, and multi-layer KNN.
pub mod search;
/// Generation-based visited set for efficient graph traversal.
pub mod visited;

pub use distance::DistanceMetric;
pub use graph::{HnswConfig, HnswIndex};
pub use insert::select_neighbors_heuristic;
pub use search::{greedy_descent, knn_search, search_layer};
