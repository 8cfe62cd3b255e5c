//! Bounded MPMC queue: multiset, FIFO, and full/drop-policy properties.

use numeri_core::queue::{BoundedQueue, PopOutcome, PushOutcome};

#[test]
fn push_pop_round_trip() {
    let q = BoundedQueue::new(4);
    assert!(q.push(1).is_accepted());
    assert!(q.push(2).is_accepted());
    assert_eq!(q.pop().into_option(), Some(1));
    assert_eq!(q.pop().into_option(), Some(2));
    assert_eq!(q.pop().into_option(), None);
}

#[test]
fn push_returns_full_with_capacity_exactly_c() {
    let q = BoundedQueue::new(2);
    assert!(q.push(1).is_accepted());
    assert!(q.push(2).is_accepted());
    match q.push(3) {
        PushOutcome::Full(v) => assert_eq!(v, 3),
        PushOutcome::Accepted => panic!("expected Full"),
    }
    assert_eq!(q.len(), q.capacity());
}

#[test]
fn fifo_within_single_producer() {
    let q = BoundedQueue::new(8);
    for i in 0..8 {
        q.push(i).is_accepted();
    }
    for i in 0..8 {
        assert_eq!(q.pop().into_option(), Some(i));
    }
}

#[test]
fn drop_newest_on_full_discards_pushed_value() {
    let q = BoundedQueue::new(1);
    q.push_drop_newest(1);
    q.push_drop_newest(2); // dropped, queue already has 1 resident
    assert_eq!(q.pop().into_option(), Some(1));
    assert_eq!(q.pop().into_option(), None);
    assert_eq!(q.dropped_count(), 1);
}

#[test]
fn drop_oldest_on_full_evicts_resident_value() {
    // capacity 2, publish v1, v2, v3;
    // popped values are v2, v3.
    let q: BoundedQueue<u32> = BoundedQueue::new(2);
    q.push_drop_oldest(1);
    q.push_drop_oldest(2);
    q.push_drop_oldest(3);

    assert_eq!(q.pop().into_option(), Some(2));
    assert_eq!(q.pop().into_option(), Some(3));
    assert_eq!(q.pop().into_option(), None);
}

proptest::proptest! {
    #[test]
    fn multiset_pushed_equals_popped_plus_resident(values in proptest::collection::vec(0u32..10_000, 0..200), capacity in 1usize..64) {
        let q = BoundedQueue::new(capacity);
        let mut accepted = Vec::new();
        for v in &values {
            if q.push(*v).is_accepted() {
                accepted.push(*v);
            }
        }

        let mut popped = Vec::new();
        while let PopOutcome::Some(v) = q.pop() {
            popped.push(v);
        }

        let mut accepted_sorted = accepted.clone();
        accepted_sorted.sort_unstable();
        let mut popped_sorted = popped.clone();
        popped_sorted.sort_unstable();
        proptest::prop_assert_eq!(accepted_sorted, popped_sorted);
    }
}
