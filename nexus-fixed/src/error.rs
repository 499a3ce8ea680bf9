//! Error type shared by queues and grids.

use crate::DefragmentMode;

/// Errors returned by fallible queue and grid operations.
///
/// Every failure kind is a separate variant so callers can branch on it,
/// e.g. a full grid versus a bad coordinate:
///
/// ```
/// use nexus_fixed::{BoundedGrid, FixedError};
///
/// let mut grid: BoundedGrid<u8> = BoundedGrid::new(1, 1).unwrap();
/// grid.add(7).unwrap();
///
/// assert!(matches!(grid.add(8), Err(FixedError::CapacityExceeded { .. })));
/// assert!(matches!(grid.get(3, 0), Err(FixedError::IndexOutOfRange { .. })));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    /// A capacity or dimension was zero at construction.
    #[error("{what} must be > 0, got {value}")]
    Configuration {
        /// Name of the rejected parameter.
        what: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// An index or coordinate was outside the container.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of addressable positions.
        len: usize,
    },

    /// The operation does not apply to the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// A grid has no cell left to receive an element.
    #[error("grid of {rows}x{cols} has no free cell after its last element")]
    CapacityExceeded {
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// The requested defragmentation mode is not implemented.
    #[error("defragment mode {0:?} is not supported")]
    Unsupported(DefragmentMode),
}

impl FixedError {
    #[inline]
    pub(crate) const fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}
