//! Versioned L2 order book
//!
//! A two-buffer structure per ingested symbol: an *active* book read by
//! consumers, and an *inactive* book mutated in place by the owning
//! ingestor. The ladder per side is unbounded and trimmed to `max_depth`
//! after every apply, since updates arrive as incremental deltas rather
//! than fixed-width snapshots.
//!
//! Apply-rate is high and read-rate is higher; locking would contend on
//! every consumer read, so mutation is single-producer and publication is
//! a pointer swap (see [`crate::snapshot`]).

mod book;

pub use book::OrderBook;

use crate::model::Side;

/// A single incremental update applied to one side of a book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookUpdate {
    pub side: Side,
    pub price: f64,
    pub new_quantity: f64,
}

impl BookUpdate {
    pub fn new(side: Side, price: f64, new_quantity: f64) -> Self {
        Self {
            side,
            price,
            new_quantity,
        }
    }
}

/// Soft bound on retained levels per side.
pub const DEFAULT_MAX_DEPTH: usize = 100;
