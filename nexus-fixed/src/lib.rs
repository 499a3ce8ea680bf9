//! Fixed-capacity collections with single-step undo.
//!
//! This crate provides two containers whose size never changes after
//! construction:
//!
//! ```text
//! BoundedQueue<T>  - FIFO of at most N elements, evicts the oldest on overflow
//! BoundedGrid<T>   - rows x cols cells, one BoundedQueue per row
//! ```
//!
//! Both are built from singly-linked [`Node`]s that live in a per-queue
//! [`NodeArena`] and link by [`NodeKey`]. Detaching a node never frees it
//! straight away: the last evicted or removed node is parked in the queue's
//! undo slot and can be put back with [`BoundedQueue::recover`].
//!
//! # Quick Start
//!
//! ```
//! use nexus_fixed::BoundedQueue;
//!
//! let mut recent = BoundedQueue::new(3).unwrap();
//! recent.extend(["a", "b", "c"]);
//! assert!(recent.is_full());
//!
//! // Full queues evict from the front.
//! assert!(!recent.add("d"));
//! assert_eq!(recent.front(), Some(&"b"));
//!
//! // One step of undo.
//! assert!(recent.recover());
//! assert_eq!(recent.to_vec(), [Some("a"), Some("b"), Some("c")]);
//! ```
//!
//! # Grids
//!
//! ```
//! use nexus_fixed::{BoundedGrid, FixedError};
//!
//! let mut grid = BoundedGrid::new(3, 3).unwrap();
//! for value in 1..=9u8 {
//!     grid.add(value).unwrap();
//! }
//! assert_eq!(grid.count(), 9);
//! assert!(matches!(grid.add(10), Err(FixedError::CapacityExceeded { .. })));
//!
//! grid.remove(1, 1).unwrap();
//! assert_eq!(grid.count(), 8);
//! assert_eq!(grid.final_data_location(), Some((2, 2)));
//! ```
//!
//! # Undo Slot
//!
//! | Operation | Parks | Origin |
//! |-----------|-------|--------|
//! | `add` on a full queue | evicted head | 0 |
//! | `remove_at(i)` | node at `i` | `i` |
//! | `remove(&value)` | last match | its position at removal |
//!
//! Parking a node frees whatever was parked before. `add` without eviction,
//! `replace`, `reverse` and `defragment` leave the slot alone.
//!
//! # Feature Flags
//!
//! - `parallel` (default) - count grid cells on the `rayon` pool

mod arena;
mod error;
mod grid;
mod node;
mod queue;

pub use arena::NodeArena;
pub use error::FixedError;
pub use grid::{BoundedGrid, DefragmentMode};
pub use node::{Node, NodeKey};
pub use queue::{BoundedQueue, IntoIter, Iter, NodeMut};
