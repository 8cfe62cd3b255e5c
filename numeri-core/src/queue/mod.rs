//! Bounded MPMC queue
//!
//! Fixed-capacity, wait-free against a fixed peer count, FIFO per producer.
//! Built on [`crossbeam_queue::ArrayQueue`], wrapped so that call sites read
//! against `Accepted`/`Full`/`Some`/`Empty` rather than the raw
//! `Result<(), T>` / `Option<T>` crossbeam returns.
//!
//! `push` never blocks. Ownership of `T` transfers to the queue on a
//! successful push and to the caller on a successful pop; a failed push
//! leaves ownership with the caller (the value comes back out in
//! [`PushOutcome::Full`]).

use crossbeam_queue::ArrayQueue;

/// Result of a [`BoundedQueue::push`].
#[derive(Debug)]
pub enum PushOutcome<T> {
    Accepted,
    /// The queue was at capacity; the value is handed back to the caller.
    Full(T),
}

impl<T> PushOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PushOutcome::Accepted)
    }
}

/// Result of a [`BoundedQueue::pop`].
#[derive(Debug)]
pub enum PopOutcome<T> {
    Some(T),
    Empty,
}

impl<T> PopOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            PopOutcome::Some(v) => Some(v),
            PopOutcome::Empty => None,
        }
    }
}

/// A fixed-capacity multi-producer/multi-consumer queue.
///
/// No failure mode propagates as an error: full and empty are status
/// returns, never `Result`s.
pub struct BoundedQueue<T> {
    inner: ArrayQueue<T>,
    dropped: std::sync::atomic::AtomicU64,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity.max(1)),
            dropped: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Non-blocking push. Never panics or blocks; returns `Full(value)`
    /// with ownership restored to the caller if the queue has no room.
    pub fn push(&self, value: T) -> PushOutcome<T> {
        match self.inner.push(value) {
            Ok(()) => PushOutcome::Accepted,
            Err(value) => PushOutcome::Full(value),
        }
    }

    /// Non-blocking pop.
    pub fn pop(&self) -> PopOutcome<T> {
        match self.inner.pop() {
            Some(v) => PopOutcome::Some(v),
            None => PopOutcome::Empty,
        }
    }

    /// Push, dropping the newest value and recording a "queue full" counter
    /// if there's no room. Used by the order, fill, and metric producers.
    pub fn push_drop_newest(&self, value: T) {
        if let PushOutcome::Full(_dropped) = self.push(value) {
            self.dropped.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    /// Push, evicting the oldest resident value first if the queue is full,
    /// then retrying. Only the L2 ingestor uses this policy.
    pub fn push_drop_oldest(&self, value: T) {
        let mut value = value;
        loop {
            match self.push(value) {
                PushOutcome::Accepted => return,
                PushOutcome::Full(v) => {
                    value = v;
                    if self.inner.pop().is_some() {
                        self.dropped.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    }
                }
            }
        }
    }

    /// Number of values dropped by either drop policy since construction.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(std::sync::atomic::Ordering::Relaxed)
    }
}
