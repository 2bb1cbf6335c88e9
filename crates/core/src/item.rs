//! Core item type: an identifier paired with a fixed-length vector.

use serde::{Deserialize, Serialize};

/// A labeled vector stored in an index.
///
/// Indexes take items by value and never hand out mutable access, so a vector
/// cannot change after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<K> {
    /// Caller-chosen identifier, unique within an index.
    pub id: K,
    /// Coordinates.
    pub vector: Vec<f32>,
}

impl<K> Item<K> {
    /// Creates an item from an id and its vector.
    pub fn new(id: K, vector: Vec<f32>) -> Self {
        Self { id, vector }
    }

    /// Number of coordinates in the vector.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

impl<K> From<(K, Vec<f32>)> for Item<K> {
    fn from((id, vector): (K, Vec<f32>)) -> Self {
        Self { id, vector }
    }
}
