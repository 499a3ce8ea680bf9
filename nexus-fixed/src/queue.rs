//! Fixed-capacity FIFO queue with a single-step undo slot.
//!
//! The queue is a singly-linked chain of [`Node`]s stored in a private
//! [`NodeArena`]. Appending past capacity evicts the head; removing a node
//! detaches it. In both cases the detached node is parked in the undo slot
//! together with the position it held, and [`BoundedQueue::recover`] puts it
//! back. The slot holds one node: parking a new one frees the previous.
//!
//! # Example
//!
//! ```
//! use nexus_fixed::BoundedQueue;
//!
//! let mut queue = BoundedQueue::new(3).unwrap();
//! queue.extend([1, 2, 3, 4]);
//! assert_eq!(queue.to_vec(), [Some(2), Some(3), Some(4)]);
//!
//! // Undo the eviction of 1.
//! assert!(queue.recover());
//! assert_eq!(queue.to_vec(), [Some(1), Some(2), Some(3)]);
//!
//! // The slot is single use.
//! assert!(!queue.recover());
//! ```
//!
//! # Complexity
//!
//! `add`, `len`, `front` and `back` are O(1). Positional access walks the
//! chain from the head and is O(n).

use core::fmt;
use core::iter::FusedIterator;

use tracing::{debug, trace};

use crate::{FixedError, Node, NodeArena, NodeKey};

/// Upper bound on the node slots reserved up front.
const PREALLOCATE_MAX: usize = 1 << 12;

/// Parked node and the position it held when it was detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Recycled {
    key: NodeKey,
    origin: usize,
}

/// A capacity-bounded FIFO built from a chain of [`Node`]s.
///
/// Elements are `Option<T>` at the node level: [`add`](Self::add) always
/// stores a value, but a node can be cleared in place through
/// [`node_mut`](Self::node_mut), leaving a gap that
/// [`defragment`](Self::defragment) removes.
///
/// The queue has no internal synchronization. Mutation takes `&mut self`.
#[derive(Clone)]
pub struct BoundedQueue<T> {
    arena: NodeArena<T>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    len: usize,
    capacity: usize,
    recycle: Option<Recycled>,
    recycle_enabled: bool,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::Configuration`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, FixedError> {
        if capacity == 0 {
            return Err(FixedError::Configuration {
                what: "capacity",
                value: capacity,
            });
        }

        Ok(Self {
            // +1 for the node parked in the undo slot.
            arena: NodeArena::with_capacity(capacity.min(PREALLOCATE_MAX) + 1),
            head: None,
            tail: None,
            len: 0,
            capacity,
            recycle: None,
            recycle_enabled: true,
        })
    }

    /// Returns the maximum number of elements.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of nodes in the chain, gaps included.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the chain is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next [`add`](Self::add) will evict.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Returns `true` if evicted and removed nodes are kept for undo.
    #[inline]
    pub const fn recycle_enabled(&self) -> bool {
        self.recycle_enabled
    }

    /// Turns the undo slot on or off.
    ///
    /// Disabling it frees any node currently parked there.
    pub fn set_recycle_enabled(&mut self, enabled: bool) {
        self.recycle_enabled = enabled;
        if !enabled
            && let Some(parked) = self.recycle.take()
        {
            self.arena.remove(parked.key);
        }
    }

    /// Returns the parked element and the position it will be restored to.
    ///
    /// The element is `None` if the parked node was a gap.
    pub fn recycled(&self) -> Option<(Option<&T>, usize)> {
        self.recycle
            .map(|parked| (self.arena[parked.key].element(), parked.origin))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Appends an element at the tail.
    ///
    /// If the queue was full, the head is evicted into the undo slot (or
    /// freed, when recycling is off). Returns `true` if the length grew,
    /// `false` if an eviction offset the insertion.
    pub fn add(&mut self, element: T) -> bool {
        let before = self.len;

        let key = self.arena.insert(Node::new(element));
        self.link_after(self.tail, key);

        if self.len > self.capacity
            && let Some(evicted) = self.detach_after(None)
        {
            trace!(capacity = self.capacity, "evicting head");
            self.park(evicted, 0);
        }

        self.len > before
    }

    /// Removes the node at `index`, parking it in the undo slot.
    ///
    /// Returns `true` if the length decreased.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<bool, FixedError> {
        if index >= self.len {
            return Err(FixedError::out_of_range(index, self.len));
        }

        let before = self.len;
        let prev = index.checked_sub(1).and_then(|i| self.key_at(i));
        if let Some(key) = self.detach_after(prev) {
            self.park(key, index);
        }

        Ok(self.len < before)
    }

    /// Removes every node whose element equals `element`.
    ///
    /// All matches are unlinked, not just the first. Only the last one
    /// removed is parked in the undo slot; the others are freed. Returns the
    /// number of nodes removed.
    pub fn remove(&mut self, element: &T) -> usize
    where
        T: PartialEq,
    {
        let mut removed = 0;
        let mut last: Option<Recycled> = None;

        let mut prev = None;
        let mut current = self.head;
        let mut position = 0;

        while let Some(key) = current {
            let next = self.arena[key].next();

            if self.arena[key].element() == Some(element) {
                self.detach_after(prev);
                if let Some(superseded) = last.replace(Recycled { key, origin: position }) {
                    self.arena.remove(superseded.key);
                }
                removed += 1;
            } else {
                prev = Some(key);
                position += 1;
            }

            current = next;
        }

        if let Some(parked) = last {
            self.park(parked.key, parked.origin);
        }

        removed
    }

    /// Restores the parked node to the position it was detached from.
    ///
    /// A node evicted from the head becomes the head again. If that pushes
    /// the length past capacity, the tail is dropped. Returns `false`, doing
    /// nothing, when the undo slot is empty.
    pub fn recover(&mut self) -> bool {
        let Some(Recycled { key, origin }) = self.recycle.take() else {
            return false;
        };

        let origin = origin.min(self.len);
        let prev = origin.checked_sub(1).and_then(|i| self.key_at(i));
        self.link_after(prev, key);

        while self.len > self.capacity {
            self.truncate_tail();
        }

        debug!(origin, len = self.len, "recovered parked node");
        true
    }

    /// Like [`recover`](Self::recover), but fails on an empty undo slot.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::InvalidOperation`] if nothing is parked.
    pub fn try_recover(&mut self) -> Result<(), FixedError> {
        if self.recover() {
            Ok(())
        } else {
            Err(FixedError::InvalidOperation("undo slot is empty"))
        }
    }

    /// Replaces every element equal to `old` with a clone of `new`.
    ///
    /// Linkage and the undo slot are untouched. Returns the number of
    /// replacements.
    pub fn replace(&mut self, old: &T, new: T) -> usize
    where
        T: PartialEq + Clone,
    {
        let mut replaced = 0;
        let mut current = self.head;

        while let Some(key) = current {
            let node = &mut self.arena[key];
            if node.element() == Some(old) {
                node.set_element(new.clone());
                replaced += 1;
            }
            current = node.next();
        }

        replaced
    }

    /// Reverses the chain in place. The tail becomes the head.
    pub fn reverse(&mut self) {
        let mut prev = None;
        let mut current = self.head;
        self.tail = self.head;

        while let Some(key) = current {
            current = self.arena[key].set_next(prev);
            prev = Some(key);
        }

        self.head = prev;
    }

    /// Drops every unset node, closing the gaps.
    ///
    /// Set elements keep their relative order. Running it twice is the same
    /// as running it once. Returns the number of gaps removed.
    pub fn defragment(&mut self) -> usize {
        let mut dropped = 0;
        let mut prev = None;
        let mut current = self.head;

        while let Some(key) = current {
            let next = self.arena[key].next();

            if self.arena[key].is_empty() {
                self.detach_after(prev);
                self.arena.remove(key);
                dropped += 1;
            } else {
                prev = Some(key);
            }

            current = next;
        }

        if dropped > 0 {
            debug!(dropped, len = self.len, "defragmented queue");
        }
        dropped
    }

    /// Frees every node, including the one in the undo slot.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.recycle = None;
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Returns the node at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `index >= len`.
    pub fn node(&self, index: usize) -> Result<&Node<T>, FixedError> {
        self.key_at(index)
            .map(|key| &self.arena[key])
            .ok_or(FixedError::out_of_range(index, self.len))
    }

    /// Returns the node at `index` mutably.
    ///
    /// Only the element can be changed through it; links are managed by
    /// the queue.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `index >= len`.
    pub fn node_mut(&mut self, index: usize) -> Result<NodeMut<'_, T>, FixedError> {
        match self.key_at(index) {
            Some(key) => Ok(NodeMut(&mut self.arena[key])),
            None => Err(FixedError::out_of_range(index, self.len)),
        }
    }

    /// Returns the element at `index`, `None` if that node is a gap.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<Option<&T>, FixedError> {
        self.node(index).map(Node::element)
    }

    /// Returns the head element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|key| self.arena[key].element())
    }

    /// Returns the tail element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|key| self.arena[key].element())
    }

    /// Returns the position of the first node equal to `element`.
    pub fn first_index_of(&self, element: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|e| e == Some(element))
    }

    /// Returns the position of the last node equal to `element`.
    pub fn last_index_of(&self, element: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter()
            .enumerate()
            .filter(|(_, e)| *e == Some(element))
            .last()
            .map(|(i, _)| i)
    }

    /// Returns `true` if any node holds `element`.
    #[inline]
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.first_index_of(element).is_some()
    }

    /// Copies the chain out, front to back, gaps as `None`.
    pub fn to_vec(&self) -> Vec<Option<T>>
    where
        T: Clone,
    {
        self.iter().map(Option::<&T>::cloned).collect()
    }

    /// Returns an iterator over the chain, front to back.
    ///
    /// Yields `None` for gaps.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            current: self.head,
            remaining: self.len,
        }
    }

    // ========================================================================
    // Chain plumbing
    // ========================================================================

    /// Walks to the key at `index`.
    fn key_at(&self, index: usize) -> Option<NodeKey> {
        if index >= self.len {
            return None;
        }

        let mut current = self.head;
        for _ in 0..index {
            current = current.and_then(|key| self.arena.next_of(key));
        }
        current
    }

    /// Links `key` after `prev`, or at the head when `prev` is `None`.
    fn link_after(&mut self, prev: Option<NodeKey>, key: NodeKey) {
        let next = match prev {
            Some(prev) => self.arena[prev].set_next(Some(key)),
            None => self.head.replace(key),
        };
        self.arena[key].set_next(next);

        if next.is_none() {
            self.tail = Some(key);
        }
        self.len += 1;
    }

    /// Detaches the node after `prev`, or the head when `prev` is `None`.
    ///
    /// The node stays in the arena.
    fn detach_after(&mut self, prev: Option<NodeKey>) -> Option<NodeKey> {
        let detached = match prev {
            Some(prev) => self.arena.skip_next(prev)?,
            None => {
                let head = self.head?;
                self.head = self.arena[head].unlink();
                head
            }
        };

        if self.tail == Some(detached) {
            self.tail = prev;
        }
        self.len -= 1;
        Some(detached)
    }

    /// Drops the tail node for good.
    fn truncate_tail(&mut self) {
        let Some(tail) = self.tail else {
            return;
        };

        let prev = self.len.checked_sub(2).and_then(|i| self.key_at(i));
        match prev {
            Some(prev) => {
                self.arena[prev].unlink();
            }
            None => self.head = None,
        }

        self.tail = prev;
        self.len -= 1;
        self.arena.remove(tail);
    }

    /// Puts a detached node in the undo slot, freeing whatever was there.
    fn park(&mut self, key: NodeKey, origin: usize) {
        if !self.recycle_enabled {
            self.arena.remove(key);
            return;
        }

        if let Some(superseded) = self.recycle.replace(Recycled { key, origin }) {
            trace!(origin = superseded.origin, "undo slot overwritten");
            self.arena.remove(superseded.key);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .field("recycled", &self.recycled())
            .finish()
    }
}

impl<T> Extend<T> for BoundedQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = Option<&'a T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for BoundedQueue<T> {
    type Item = Option<T>;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { queue: self }
    }
}

/// Mutable view of a queued node's element.
///
/// Links stay under the queue's control; only the element is exposed.
#[derive(Debug)]
pub struct NodeMut<'a, T>(&'a mut Node<T>);

impl<T> NodeMut<'_, T> {
    /// Returns the element, if set.
    #[inline]
    pub fn element(&self) -> Option<&T> {
        self.0.element()
    }

    /// Returns the element mutably, if set.
    #[inline]
    pub fn element_mut(&mut self) -> Option<&mut T> {
        self.0.element_mut()
    }

    /// Stores `element`, returning the previous one.
    #[inline]
    pub fn set_element(&mut self, element: T) -> Option<T> {
        self.0.set_element(element)
    }

    /// Takes the element out, leaving a gap.
    #[inline]
    pub fn take_element(&mut self) -> Option<T> {
        self.0.take_element()
    }

    /// Clears the element, leaving a gap.
    #[inline]
    pub fn clear_element(&mut self) {
        self.0.clear_element();
    }

    /// Returns `true` if the node is a gap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Iterator over a [`BoundedQueue`], front to back.
#[derive(Debug)]
pub struct Iter<'a, T> {
    arena: &'a NodeArena<T>,
    current: Option<NodeKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = Option<&'a T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let key = self.current?;
        let node = &self.arena[key];
        self.current = node.next();
        self.remaining -= 1;
        Some(node.element())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`BoundedQueue`], front to back.
///
/// Yields `None` for gaps. The parked node, if any, is dropped with the
/// iterator.
#[derive(Debug)]
pub struct IntoIter<T> {
    queue: BoundedQueue<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = Option<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let key = self.queue.detach_after(None)?;
        self.queue.arena.remove(key).map(|node| node.element)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len, Some(self.queue.len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
