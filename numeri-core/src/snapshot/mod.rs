//! Snapshot publication protocol
//!
//! A process-wide registry of "most recently published book", one entry
//! per symbol, owned by the Kernel and populated as ingestors start — never
//! a lazily-initialised global. Publication is a lock-free atomic pointer
//! swap: [`arc_swap::ArcSwap`] gives every reader a whole, immutable
//! `Arc<OrderBook>` per `load()`, so there is no point at which a consumer
//! can observe a torn book.
//!
//! [`Snapshot`] is the weak, versioned handle that crosses the L2 queue.
//! Its fast path reads straight off the cell it was handed; if the
//! producer has since republished into that same cell (bumping the
//! version), the fast path's version check fails and the consumer falls
//! back to a fresh [`BookRegistry::current`] lookup.

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::orderbook::OrderBook;

/// One symbol's published-book cell. Readers call `load()`; the owning
/// Ingestor calls `store()` once per publish.
pub type BookCell = ArcSwap<OrderBook>;

/// The Kernel-owned registry of "current" books, keyed by symbol.
///
/// Populated as ingestors start and cleared on `stop()` — never a
/// lazily-initialised global.
#[derive(Default)]
pub struct BookRegistry {
    cells: DashMap<String, Arc<BookCell>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// Get (or lazily create, the first time a symbol is seen) the cell
    /// for a symbol. Ingestors call this once at init to get the handle
    /// they publish into.
    pub fn cell_for(&self, symbol: &str) -> Arc<BookCell> {
        self.cells
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(ArcSwap::from_pointee(OrderBook::new(symbol))))
            .clone()
    }

    /// Slow-path / fallback read: the freshest published book for a symbol.
    pub fn current(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.cells.get(symbol).map(|cell| cell.load_full())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.cells.iter().map(|e| e.key().clone()).collect()
    }

    pub fn clear(&self) {
        self.cells.clear();
    }
}

/// A versioned, weakly-owned observation of a published book.
///
/// Cheap to clone (an `Arc` clone plus two integers). A Snapshot does
/// not own the book; it names a cell and the version it expected to find
/// there at publish time.
#[derive(Clone)]
pub struct Snapshot {
    cell: Arc<BookCell>,
    pub version: u64,
    pub timestamp_ns: u64,
}

impl Snapshot {
    pub fn new(cell: Arc<BookCell>, version: u64, timestamp_ns: u64) -> Self {
        Self {
            cell,
            version,
            timestamp_ns,
        }
    }

    /// Fast-path read: load the cell and check its version against
    /// the version recorded at publish time. `Some` only if they match.
    pub fn read_fast(&self) -> Option<Arc<OrderBook>> {
        let book = self.cell.load_full();
        if book.version() == self.version {
            Some(book)
        } else {
            None
        }
    }

    /// Slow-path read: re-consult the cell regardless of version,
    /// returning whatever is current. The caller should prefer
    /// [`BookRegistry::current`] when it has access to the registry;
    /// this method exists for call sites that only hold the Snapshot.
    pub fn read_slow(&self) -> Arc<OrderBook> {
        self.cell.load_full()
    }

    /// Fast path first, falling back to the slow path on a version
    /// mismatch. This is the read discipline a consumer normally uses.
    pub fn read(&self) -> Arc<OrderBook> {
        match self.read_fast() {
            Some(book) => book,
            None => self.read_slow(),
        }
    }
}

/// Owns the double-buffered pair of [`OrderBook`]s for one symbol and
/// drives the publication sequence: mutate the inactive buffer, bump its
/// version, publish it into the registry's cell, flip which buffer is
/// inactive, then push a [`Snapshot`] handle onto the L2 queue. The two
/// buffers are plain owned `OrderBook`s; only a clone of the inactive one
/// is ever shared, through the registry.
pub struct BookPublisher {
    symbol: String,
    buffers: [OrderBook; 2],
    inactive_idx: usize,
    cell: Arc<BookCell>,
}

impl BookPublisher {
    pub fn new(symbol: impl Into<String>, registry: &BookRegistry) -> Self {
        let symbol = symbol.into();
        let cell = registry.cell_for(&symbol);
        Self {
            buffers: [OrderBook::new(&symbol), OrderBook::new(&symbol)],
            inactive_idx: 0,
            cell,
            symbol,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Applies one update to the inactive buffer.
    pub fn apply(
        &mut self,
        update: crate::orderbook::BookUpdate,
    ) -> Result<(), crate::errors::NumeriError> {
        self.buffers[self.inactive_idx].apply(update)
    }

    /// Publishes the inactive buffer and returns a [`Snapshot`] handle
    /// ready to push onto the L2 queue.
    ///
    /// After the swap, the new inactive buffer is resynced to the content
    /// just published rather than left as whatever stale state it held
    /// two publishes ago — otherwise deltas applied to one buffer would
    /// never reach the other and every other publish would silently drop
    /// roughly half of all previously-applied levels.
    pub fn publish(&mut self, timestamp_ns: u64) -> Snapshot {
        let current_global_version = self.cell.load().version();
        self.buffers[self.inactive_idx].bump_version(current_global_version);

        let published = Arc::new(self.buffers[self.inactive_idx].clone());
        let version = published.version();
        self.cell.store(published.clone());

        let next_inactive_idx = 1 - self.inactive_idx;
        self.buffers[next_inactive_idx] = (*published).clone();
        self.inactive_idx = next_inactive_idx;

        Snapshot::new(self.cell.clone(), version, timestamp_ns)
    }
}
