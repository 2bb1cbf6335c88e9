//! Search result types shared by the exact and approximate indexes.

pub mod types;

pub use types::SearchResult;
