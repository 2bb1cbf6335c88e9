//! Error types shared by both indexes.

use thiserror::Error;

/// Errors that can occur when building or querying an index.
///
/// All variants are local validation failures. They are raised before any
/// mutation, so a rejected insert leaves the index unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A vector's length differs from the index's configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The configured dimension.
        expected: usize,
        /// The length of the offending vector.
        actual: usize,
    },

    /// A construction parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The index already holds an item with this identifier.
    #[error("duplicate item id: {0}")]
    DuplicateId(String),

    /// The index cannot address any more nodes.
    #[error("index is full: capacity {0}")]
    CapacityExceeded(usize),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Returns `DimensionMismatch` unless `actual == expected`.
#[inline]
pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(IndexError::DimensionMismatch { expected, actual })
    }
}

/// Validates an index dimension against `1..=MAX_DIMENSION`.
pub(crate) fn check_index_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 || dimension > crate::config::MAX_DIMENSION {
        return Err(IndexError::InvalidConfiguration(format!(
            "dimension must be in 1..={}, got {}",
            crate::config::MAX_DIMENSION,
            dimension
        )));
    }
    Ok(())
}
