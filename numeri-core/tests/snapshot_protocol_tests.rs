//! Snapshot publication protocol: fast-path validity, fast-to-slow-path
//! fallback on a stale version, buffer alternation, and the no-torn-read
//! property.

use std::sync::Arc;

use numeri_core::model::Side;
use numeri_core::orderbook::{BookUpdate, OrderBook};
use numeri_core::snapshot::{BookCell, BookPublisher, BookRegistry, Snapshot};

fn publish(cell: &Arc<BookCell>, symbol: &str, version: u64, bid: f64) -> Snapshot {
    let mut book = OrderBook::new(symbol);
    book.apply(BookUpdate::new(Side::Buy, bid, 1.0)).unwrap();
    book.bump_version(version - 1);
    let version = book.version();
    cell.store(Arc::new(book));
    Snapshot::new(cell.clone(), version, 0)
}

#[test]
fn fast_path_valid_immediately_after_publish() {
    let registry = BookRegistry::new();
    let cell = registry.cell_for("X");
    let snap = publish(&cell, "X", 1, 100.0);
    assert!(snap.read_fast().is_some());
}

#[test]
fn fast_to_slow_path_on_stale_snapshot() {
    // consumer holds S(v=7); producer republishes into the
    // same cell at v=8 then v=9; the stale snapshot must fall back.
    let registry = BookRegistry::new();
    let cell = registry.cell_for("X");

    let stale = publish(&cell, "X", 7, 100.0);
    assert_eq!(stale.version, 7);

    publish(&cell, "X", 8, 101.0);
    let latest = publish(&cell, "X", 9, 102.0);
    assert_eq!(latest.version, 9);

    assert!(stale.read_fast().is_none());
    let recovered = stale.read_slow();
    assert!(recovered.version() >= 9);

    let via_registry = registry.current("X").unwrap();
    assert!(via_registry.version() >= 9);
}

#[test]
fn book_publisher_alternates_buffers_and_bumps_version_monotonically() {
    let registry = BookRegistry::new();
    let mut publisher = BookPublisher::new("X", &registry);

    publisher
        .apply(BookUpdate::new(Side::Buy, 100.0, 1.0))
        .unwrap();
    let s1 = publisher.publish(1);
    assert_eq!(s1.version, 1);

    publisher
        .apply(BookUpdate::new(Side::Buy, 101.0, 1.0))
        .unwrap();
    let s2 = publisher.publish(2);
    assert_eq!(s2.version, 2);

    // s1 is now stale: the global cell has moved on to version 2.
    assert!(s1.read_fast().is_none());
    assert!(s2.read_fast().is_some());
}

#[test]
fn publisher_accumulates_levels_across_alternating_buffers() {
    // Each publish cycle applies a level to a different price; since
    // BookPublisher alternates which of its two internal OrderBooks is
    // inactive, this only passes if the idle buffer is kept in sync
    // with what was just published rather than starting from whatever
    // it held two publishes ago.
    let registry = BookRegistry::new();
    let mut publisher = BookPublisher::new("X", &registry);

    publisher
        .apply(BookUpdate::new(Side::Buy, 100.0, 1.0))
        .unwrap();
    publisher.publish(1);

    publisher
        .apply(BookUpdate::new(Side::Buy, 99.0, 1.0))
        .unwrap();
    publisher.publish(2);

    publisher
        .apply(BookUpdate::new(Side::Sell, 101.0, 1.0))
        .unwrap();
    let s3 = publisher.publish(3);

    let book = s3.read_fast().expect("fresh snapshot reads fast-path");
    assert_eq!(book.bid_depth(), 2);
    assert_eq!(book.ask_depth(), 1);
    assert_eq!(book.best_bid(), 100.0);
    let levels: Vec<f64> = book.bid_levels().into_iter().map(|l| l.price).collect();
    assert!(levels.contains(&100.0));
    assert!(levels.contains(&99.0));
}

#[test]
fn no_torn_book_is_ever_observed() {
    // Each load() yields a whole Arc<OrderBook>; there is no partial
    // state to observe between bids and asks.
    let registry = BookRegistry::new();
    let cell = registry.cell_for("X");
    let mut book = OrderBook::new("X");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    book.apply(BookUpdate::new(Side::Sell, 101.0, 1.0)).unwrap();
    cell.store(Arc::new(book));

    let read = cell.load_full();
    assert_eq!(read.bid_depth(), 1);
    assert_eq!(read.ask_depth(), 1);
}
