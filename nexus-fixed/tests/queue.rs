use nexus_fixed::{BoundedQueue, FixedError};

fn queue_of(capacity: usize, values: impl IntoIterator<Item = u32>) -> BoundedQueue<u32> {
    let mut queue = BoundedQueue::new(capacity).unwrap();
    queue.extend(values);
    queue
}

fn contents(queue: &BoundedQueue<u32>) -> Vec<u32> {
    queue.iter().flatten().copied().collect()
}

// =============================================================================
// Capacity and eviction
// =============================================================================

#[test]
fn len_tracks_adds_up_to_capacity() {
    for capacity in 1..=8 {
        let mut queue = BoundedQueue::new(capacity).unwrap();
        for n in 1..=capacity {
            assert!(queue.add(n));
            assert_eq!(queue.len(), n);
            assert_eq!(queue.is_full(), n == capacity);
        }
    }
}

#[test]
fn len_stays_at_capacity_when_overflowing() {
    let mut queue = BoundedQueue::new(4).unwrap();
    for n in 0..100u32 {
        queue.add(n);
        assert!(queue.len() <= 4);
    }
    assert_eq!(queue.len(), 4);
    assert_eq!(contents(&queue), [96, 97, 98, 99]);
}

#[test]
fn fifo_eviction() {
    let queue = queue_of(3, [1, 2, 3, 4]);
    assert_eq!(contents(&queue), [2, 3, 4]);
}

#[test]
fn zero_capacity_is_a_configuration_error() {
    assert!(matches!(
        BoundedQueue::<u32>::new(0),
        Err(FixedError::Configuration { what: "capacity", value: 0 })
    ));
}

// =============================================================================
// Undo
// =============================================================================

#[test]
fn recovery_restores_pre_eviction_state() {
    let mut queue = queue_of(3, [1, 2, 3, 4]);

    assert!(queue.recover());
    assert_eq!(contents(&queue), [1, 2, 3]);

    assert!(!queue.recover());
    assert_eq!(contents(&queue), [1, 2, 3]);
    assert_eq!(
        queue.try_recover(),
        Err(FixedError::InvalidOperation("undo slot is empty"))
    );
}

#[test]
fn removal_supersedes_eviction() {
    let mut queue = queue_of(3, [1, 2, 3, 4]);
    queue.remove_at(1).unwrap();
    assert_eq!(contents(&queue), [2, 4]);

    // 1 is gone for good; 3 comes back.
    assert!(queue.recover());
    assert_eq!(contents(&queue), [2, 3, 4]);
    assert!(!queue.recover());
}

#[test]
fn remove_then_recover_at_every_position() {
    for index in 0..5 {
        let mut queue = queue_of(5, [10, 20, 30, 40, 50]);
        queue.remove_at(index).unwrap();
        assert_eq!(queue.len(), 4);
        assert!(queue.recover());
        assert_eq!(contents(&queue), [10, 20, 30, 40, 50], "index {index}");
    }
}

// Removal by value takes out every match even though only one node fits in
// the undo slot.
#[test]
fn remove_by_value_is_multi_match() {
    let mut queue = queue_of(6, [3, 1, 3, 3, 2, 3]);
    assert_eq!(queue.remove(&3), 4);
    assert_eq!(contents(&queue), [1, 2]);

    assert!(queue.recover());
    assert_eq!(contents(&queue), [1, 2, 3]);
}

// =============================================================================
// Reshaping
// =============================================================================

#[test]
fn reverse_twice_is_identity() {
    for len in 1..=6u32 {
        let mut queue = queue_of(6, 0..len);
        let before = contents(&queue);

        queue.reverse();
        let mut expected = before.clone();
        expected.reverse();
        assert_eq!(contents(&queue), expected);

        queue.reverse();
        assert_eq!(contents(&queue), before);
    }
}

#[test]
fn defragment_is_idempotent() {
    let mut queue = queue_of(6, [1, 2, 3, 4, 5, 6]);
    for index in [0, 3, 5] {
        queue.node_mut(index).unwrap().clear_element();
    }

    queue.defragment();
    let once = queue.to_vec();
    queue.defragment();
    assert_eq!(queue.to_vec(), once);
    assert_eq!(once, [Some(2), Some(3), Some(5)]);
}

#[test]
fn defragmented_queue_accepts_new_elements() {
    let mut queue = queue_of(3, [1, 2, 3]);
    queue.node_mut(2).unwrap().clear_element();
    queue.defragment();

    assert!(queue.add(4));
    assert_eq!(contents(&queue), [1, 2, 4]);
    assert!(!queue.add(5));
    assert_eq!(contents(&queue), [2, 4, 5]);
}

#[test]
fn replace_leaves_undo_slot_alone() {
    let mut queue = queue_of(2, [1, 2, 3]);
    assert_eq!(queue.replace(&3, 30), 1);
    assert_eq!(contents(&queue), [2, 30]);

    assert!(queue.recover());
    assert_eq!(contents(&queue), [1, 2]);
}

// =============================================================================
// Access
// =============================================================================

#[test]
fn indexer_bounds() {
    let queue = queue_of(4, [5, 6]);
    assert_eq!(queue.get(0), Ok(Some(&5)));
    assert_eq!(queue.get(1), Ok(Some(&6)));
    assert!(matches!(
        queue.node(2),
        Err(FixedError::IndexOutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn to_vec_length_matches_len() {
    let mut queue = queue_of(4, [1, 2, 3]);
    queue.node_mut(1).unwrap().clear_element();
    assert_eq!(queue.to_vec().len(), queue.len());
}

#[test]
fn queue_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BoundedQueue<String>>();
}
