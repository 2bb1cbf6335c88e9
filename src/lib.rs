//! # knnbench
//!
//! Benchmarks an approximate HNSW graph against an exact k-d tree on the same
//! dataset: build time, query latency, and recall@k of the graph measured
//! against the tree.
//!
//! The indexes live in [`knnbench_core`]; this crate re-exports them and owns
//! the benchmark binaries under `benches/`.
//!
//! ## Architecture
//!
//! ```text
//! dataset (id, vector) ─┬─> KdTree    ─> k_nearest     ─┐
//!                       └─> HnswIndex ─> find_nearest  ─┴─> recall@k
//! ```

pub use knnbench_core::*;
