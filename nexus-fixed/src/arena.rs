//! Node storage with stable keys.
//!
//! Each queue owns one arena. Nodes link to each other by [`NodeKey`] instead
//! of by pointer, so detaching a node, parking it in an undo slot, and
//! splicing it back are all key moves. Slots freed by `remove` are reused by
//! later inserts.

use core::ops::{Index, IndexMut};

use slab::Slab;

use crate::{Node, NodeKey};

/// Slab-backed storage for [`Node`]s.
///
/// # Example
///
/// ```
/// use nexus_fixed::{Node, NodeArena};
///
/// let mut arena: NodeArena<u64> = NodeArena::with_capacity(4);
/// let tail = arena.insert(Node::new(2));
/// let head = arena.insert(Node::with_next(1, tail));
///
/// // Detach `tail` from `head` without freeing it.
/// assert_eq!(arena.skip_next(head), Some(tail));
/// assert_eq!(arena.get(head).unwrap().next(), None);
/// assert_eq!(arena.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    slots: Slab<Node<T>>,
}

impl<T> NodeArena<T> {
    /// Creates an arena with room for `capacity` nodes before reallocating.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
        }
    }

    /// Returns the number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Stores a node, returning its key.
    #[inline]
    pub fn insert(&mut self, node: Node<T>) -> NodeKey {
        NodeKey(self.slots.insert(node))
    }

    /// Frees the node at `key`, returning it.
    ///
    /// Returns `None` if `key` is not live.
    #[inline]
    pub fn remove(&mut self, key: NodeKey) -> Option<Node<T>> {
        self.slots.try_remove(key.0)
    }

    /// Returns the node at `key`.
    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&Node<T>> {
        self.slots.get(key.0)
    }

    /// Returns the successor key of the node at `key`.
    #[inline]
    pub fn next_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.slots.get(key.0).and_then(Node::next)
    }

    /// Re-links the node at `key` past its immediate successor.
    ///
    /// The successor is detached but stays in the arena; its own link is
    /// cleared so it belongs to no chain. Returns the detached key, or `None`
    /// if `key` has no successor.
    pub fn skip_next(&mut self, key: NodeKey) -> Option<NodeKey> {
        let detached = self.next_of(key)?;
        let after = self.slots.get_mut(detached.0)?.unlink();
        self.slots.get_mut(key.0)?.set_next(after);
        Some(detached)
    }

    /// Frees every node.
    ///
    /// Any key held elsewhere is dangling afterwards.
    #[inline]
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T> Index<NodeKey> for NodeArena<T> {
    type Output = Node<T>;

    /// # Panics
    ///
    /// Panics if `key` is not live.
    #[inline]
    fn index(&self, key: NodeKey) -> &Node<T> {
        &self.slots[key.0]
    }
}

impl<T> IndexMut<NodeKey> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut Node<T> {
        &mut self.slots[key.0]
    }
}
