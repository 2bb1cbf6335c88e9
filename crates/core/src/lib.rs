//! # knnbench-core
//!
//! In-memory nearest-neighbor search over fixed-dimension `f32` vectors:
//! an exact k-d tree and an approximate HNSW graph, plus the recall
//! measurement that compares the two.
//!
//! ```text
//! Item { id, vector } ─┬─> KdTree::insert     ─> KdTree::k_nearest     (exact)
//!                      └─> HnswIndex::insert  ─> HnswIndex::find_nearest (approximate)
//!                                      eval::measure_recall compares the two
//! ```
//!
//! Both indexes validate vector length at their boundary and report failures as
//! [`IndexError`]. Everything runs on the calling thread.

/// Global configuration constants: limits, defaults, and tuning parameters.
pub mod config;
/// Error type shared by both indexes.
pub mod error;
/// Recall measurement and brute-force reference search.
pub mod eval;
/// HNSW approximate nearest neighbor index: graph structure, search, insertion, and distance metrics.
pub mod hnsw;
/// Labeled vector type stored by both indexes.
pub mod item;
/// Exact k-d tree with pruned k-nearest-neighbor search.
pub mod kdtree;
/// Search result types.
pub mod search;

pub use error::{IndexError, Result};
pub use eval::{brute_force_knn, measure_recall, recall_at_k, RecallReport};
pub use hnsw::{DistanceMetric, HnswConfig, HnswIndex};
pub use item::Item;
pub use kdtree::KdTree;
pub use search::SearchResult;
