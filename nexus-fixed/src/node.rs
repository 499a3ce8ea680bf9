//! Singly-linked node cells.
//!
//! A node holds one optional element and the key of its successor in the
//! owning [`NodeArena`](crate::NodeArena). Keys are moved between links,
//! never duplicated, so a node is reachable from at most one place.

/// Stable key of a node inside a [`NodeArena`](crate::NodeArena).
///
/// Keys stay valid until the node is removed from its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(pub(crate) usize);

impl NodeKey {
    /// Returns the raw slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A cell in a singly-linked chain.
///
/// `element` is `None` when the cell is unset. Clearing an element leaves the
/// node linked, which is how gaps appear inside a chain.
///
/// # Example
///
/// ```
/// use nexus_fixed::Node;
///
/// let mut node = Node::new(7u32);
/// assert_eq!(node.element(), Some(&7));
/// assert!(node.next().is_none());
///
/// node.clear_element();
/// assert!(node.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub(crate) element: Option<T>,
    pub(crate) next: Option<NodeKey>,
}

impl<T> Node<T> {
    /// Creates a node with no successor.
    #[inline]
    pub const fn new(element: T) -> Self {
        Self {
            element: Some(element),
            next: None,
        }
    }

    /// Creates a node linked to an existing successor.
    ///
    /// Ownership of `next` passes to the new node; the caller must not keep
    /// linking it from anywhere else.
    #[inline]
    pub const fn with_next(element: T, next: NodeKey) -> Self {
        Self {
            element: Some(element),
            next: Some(next),
        }
    }

    /// Creates an unset, unlinked node.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            element: None,
            next: None,
        }
    }

    /// Returns the stored element, if set.
    #[inline]
    pub const fn element(&self) -> Option<&T> {
        self.element.as_ref()
    }

    /// Returns the stored element mutably, if set.
    #[inline]
    pub fn element_mut(&mut self) -> Option<&mut T> {
        self.element.as_mut()
    }

    /// Stores `element`, returning the previous one.
    #[inline]
    pub fn set_element(&mut self, element: T) -> Option<T> {
        self.element.replace(element)
    }

    /// Takes the element out, leaving the node unset.
    #[inline]
    pub fn take_element(&mut self) -> Option<T> {
        self.element.take()
    }

    /// Resets the element to unset. Linkage is unchanged.
    #[inline]
    pub fn clear_element(&mut self) {
        self.element = None;
    }

    /// Returns `true` if the node holds no element.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.element.is_none()
    }

    /// Returns the successor's key.
    #[inline]
    pub const fn next(&self) -> Option<NodeKey> {
        self.next
    }

    /// Points this node at a new successor, returning the old one.
    #[inline]
    pub fn set_next(&mut self, next: Option<NodeKey>) -> Option<NodeKey> {
        core::mem::replace(&mut self.next, next)
    }

    /// Drops the link to the successor, truncating the chain here.
    ///
    /// Returns the key that was linked.
    #[inline]
    pub fn unlink(&mut self) -> Option<NodeKey> {
        self.next.take()
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_no_successor() {
        let node = Node::new(1u64);
        assert_eq!(node.element(), Some(&1));
        assert_eq!(node.next(), None);
        assert!(!node.is_empty());
    }

    #[test]
    fn with_next_links() {
        let node = Node::with_next(1u64, NodeKey(4));
        assert_eq!(node.next(), Some(NodeKey(4)));
    }

    #[test]
    fn clear_element_keeps_link() {
        let mut node = Node::with_next(1u64, NodeKey(2));
        node.clear_element();
        assert!(node.is_empty());
        assert_eq!(node.next(), Some(NodeKey(2)));
    }

    #[test]
    fn unlink_returns_old_successor() {
        let mut node = Node::with_next("a", NodeKey(9));
        assert_eq!(node.unlink(), Some(NodeKey(9)));
        assert_eq!(node.next(), None);
        assert_eq!(node.unlink(), None);
    }

    #[test]
    fn set_and_take_element() {
        let mut node: Node<String> = Node::default();
        assert!(node.is_empty());

        assert_eq!(node.set_element("x".into()), None);
        assert_eq!(node.set_element("y".into()), Some("x".into()));
        assert_eq!(node.take_element(), Some("y".into()));
        assert!(node.is_empty());
    }
}
