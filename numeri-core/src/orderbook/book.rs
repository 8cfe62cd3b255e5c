use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::NumeriError;
use crate::model::Side;
use crate::orderbook::{BookUpdate, DEFAULT_MAX_DEPTH};

/// A price used as a `BTreeMap` key. `f64` has no total order (NaN), but
/// book prices are never NaN in practice; `total_cmp` gives a consistent
/// order without pulling in an ordered-float crate for one comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceKey(f64);

impl Eq for PriceKey {}
impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A versioned, mutable L2 order book owned exclusively by one Ingestor.
///
/// `bids` and `asks` are kept in a `BTreeMap` keyed by price so inserts,
/// deletes, and the top-of-book read are all `O(log depth)`. Bids iterate
/// ascending internally; [`OrderBook::best_bid`] reads the back of the
/// map (the highest key), asks read the front (the lowest key).
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: String,
    bids: BTreeMap<PriceKey, f64>,
    asks: BTreeMap<PriceKey, f64>,
    sequence: u64,
    version: u64,
    last_update_ns: u64,
    max_depth: usize,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_max_depth(symbol, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(symbol: impl Into<String>, max_depth: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            sequence: 0,
            version: 0,
            last_update_ns: 0,
            max_depth: max_depth.max(1),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn last_update_ns(&self) -> u64 {
        self.last_update_ns
    }

    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Best bid price, or `0.0` if the bid side is empty.
    pub fn best_bid(&self) -> f64 {
        self.bids.keys().next_back().map(|k| k.0).unwrap_or(0.0)
    }

    /// Best ask price, or `0.0` if the ask side is empty.
    pub fn best_ask(&self) -> f64 {
        self.asks.keys().next().map(|k| k.0).unwrap_or(0.0)
    }

    pub fn best_bid_quantity(&self) -> f64 {
        self.bids
            .iter()
            .next_back()
            .map(|(_, q)| *q)
            .unwrap_or(0.0)
    }

    pub fn best_ask_quantity(&self) -> f64 {
        self.asks.iter().next().map(|(_, q)| *q).unwrap_or(0.0)
    }

    /// Whether the book is crossed: both sides non-empty and `best_bid >= best_ask`.
    pub fn is_crossed(&self) -> bool {
        let (bid, ask) = (self.best_bid(), self.best_ask());
        !self.bids.is_empty() && !self.asks.is_empty() && bid >= ask
    }

    /// Bid levels descending by price (best first).
    pub fn bid_levels(&self) -> Vec<crate::model::PriceLevel> {
        self.bids
            .iter()
            .rev()
            .map(|(k, q)| crate::model::PriceLevel::new(k.0, *q))
            .collect()
    }

    /// Ask levels ascending by price (best first).
    pub fn ask_levels(&self) -> Vec<crate::model::PriceLevel> {
        self.asks
            .iter()
            .map(|(k, q)| crate::model::PriceLevel::new(k.0, *q))
            .collect()
    }

    /// Apply one incremental update:
    /// 1. `new_qty <= 0` removes the level at `price`.
    /// 2. Otherwise insert-or-replace.
    /// 3. Trim the side down to `max_depth`.
    /// 4. Increment `sequence`.
    ///
    /// Returns an [`NumeriError::InvariantViolation`] if applying the
    /// update would cross the book — the caller (the Kernel or the
    /// Ingestor itself) treats this as fatal.
    pub fn apply(&mut self, update: BookUpdate) -> Result<(), NumeriError> {
        self.apply_at(update, now_ns())
    }

    /// Same as [`OrderBook::apply`] but with an explicit timestamp, for
    /// deterministic tests.
    pub fn apply_at(&mut self, update: BookUpdate, timestamp_ns: u64) -> Result<(), NumeriError> {
        let side_map = match update.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let key = PriceKey(update.price);

        if update.new_quantity <= 0.0 {
            side_map.remove(&key);
        } else {
            side_map.insert(key, update.new_quantity);
        }

        trim_to_depth(side_map, update.side, self.max_depth);

        self.sequence += 1;
        self.last_update_ns = timestamp_ns;

        if self.is_crossed() {
            return Err(NumeriError::InvariantViolation {
                component: format!("orderbook[{}]", self.symbol),
                reason: format!(
                    "book crossed after apply: best_bid={} best_ask={}",
                    self.best_bid(),
                    self.best_ask()
                ),
            });
        }

        Ok(())
    }

    /// Bump the publication version. Called by the Ingestor once per
    /// batch of applies, before the buffer swap.
    pub fn bump_version(&mut self, at_least: u64) {
        self.version = self.version.max(at_least) + 1;
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn trim_to_depth(map: &mut BTreeMap<PriceKey, f64>, side: Side, max_depth: usize) {
    while map.len() > max_depth {
        // The "farthest from top" level: lowest bid, highest ask.
        let farthest = match side {
            Side::Buy => map.keys().next().copied(),
            Side::Sell => map.keys().next_back().copied(),
        };
        if let Some(key) = farthest {
            map.remove(&key);
        } else {
            break;
        }
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
