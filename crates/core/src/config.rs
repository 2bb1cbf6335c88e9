//! Global configuration constants for knnbench.
//!
//! Default tuning parameters and input validation limits are defined here.
//! These are compile-time constants; runtime tuning is done through
//! [`HnswConfig`](crate::hnsw::HnswConfig).

/// Default number of bidirectional links per HNSW node on layers above 0.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64. Default: 16.
pub const HNSW_DEFAULT_M: usize = 16;

/// Smallest accepted M. With M = 1 the layer multiplier `1 / ln(M)` is infinite.
pub const HNSW_MIN_M: usize = 2;

/// Default ef parameter during HNSW index construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down build time.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default ef parameter during HNSW search.
///
/// Controls the size of the dynamic candidate list during query.
/// Higher values improve recall at the cost of latency.
pub const HNSW_DEFAULT_EF_SEARCH: usize = 50;

/// Maximum number of layers in the HNSW graph.
pub const HNSW_DEFAULT_MAX_LAYERS: usize = 16;

/// Hard ceiling on `max_layers`; layer numbers are stored as `u8`.
pub const HNSW_MAX_LAYERS_LIMIT: usize = 64;

/// Default seed for the layer-assignment RNG.
pub const HNSW_DEFAULT_SEED: u64 = 0x5EED_1234;

/// Number of inserted items between progress callbacks in `HnswIndex::add_all`.
pub const HNSW_PROGRESS_INTERVAL: usize = 100_000;

/// Most `f32`s an HNSW index reserves up front from its `max_item_count` hint
/// (256 MiB). Larger hints still work; the arena grows on demand past this.
pub const HNSW_PREALLOC_FLOATS: usize = 1 << 26;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Node handles are `u32`, so no index holds more items than this.
pub const MAX_ITEMS: usize = u32::MAX as usize;
