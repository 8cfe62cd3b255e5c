//! Versioned order book: apply/delete/max-depth/crossing/round-trip
//! properties, including the literal empty/single-sided/crossed/delete
//! scenarios.

use numeri_core::errors::NumeriError;
use numeri_core::model::Side;
use numeri_core::orderbook::{BookUpdate, OrderBook};

#[test]
fn empty_book_best_prices_are_zero() {
    let book = OrderBook::new("BTC-USD");
    assert_eq!(book.best_bid(), 0.0);
    assert_eq!(book.best_ask(), 0.0);
}

#[test]
fn single_sided_book() {
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    assert_eq!(book.best_bid(), 100.0);
    assert_eq!(book.best_ask(), 0.0);
}

#[test]
fn crossing_update_is_invariant_violation() {
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    let err = book.apply(BookUpdate::new(Side::Sell, 99.0, 1.0));
    assert!(matches!(err, Err(NumeriError::InvariantViolation { .. })));
}

#[test]
fn delete_removes_level_and_sequence_increments() {
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    book.apply(BookUpdate::new(Side::Buy, 100.0, 0.0)).unwrap();
    assert!(book.is_empty());
    assert_eq!(book.sequence(), 2);
}

#[test]
fn delete_is_idempotent() {
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 0.0)).unwrap();
    book.apply(BookUpdate::new(Side::Buy, 100.0, 0.0)).unwrap();
    assert!(book.is_empty());
    assert_eq!(book.sequence(), 2);
}

#[test]
fn sequence_strictly_increases() {
    let mut book = OrderBook::new("BTC-USD");
    let mut last = book.sequence();
    for i in 0..50 {
        book.apply(BookUpdate::new(Side::Buy, 100.0 - i as f64, 1.0))
            .unwrap();
        assert!(book.sequence() > last);
        last = book.sequence();
    }
}

#[test]
fn max_depth_is_respected_for_both_sides() {
    let mut book = OrderBook::with_max_depth("BTC-USD", 3);
    for i in 0..10 {
        book.apply(BookUpdate::new(Side::Buy, 100.0 - i as f64, 1.0))
            .unwrap();
        book.apply(BookUpdate::new(Side::Sell, 200.0 + i as f64, 1.0))
            .unwrap();
    }
    assert_eq!(book.bid_depth(), 3);
    assert_eq!(book.ask_depth(), 3);
    // Farthest-from-top levels were evicted: best bid stays 100, best ask 200.
    assert_eq!(book.best_bid(), 100.0);
    assert_eq!(book.best_ask(), 200.0);
}

#[test]
fn round_trip_sequence_then_inverse_leaves_book_empty() {
    let mut book = OrderBook::new("BTC-USD");
    let updates = [
        BookUpdate::new(Side::Buy, 100.0, 1.0),
        BookUpdate::new(Side::Buy, 99.0, 2.0),
        BookUpdate::new(Side::Sell, 101.0, 1.5),
    ];
    for u in &updates {
        book.apply(*u).unwrap();
    }
    for u in &updates {
        book.apply(BookUpdate::new(u.side, u.price, 0.0)).unwrap();
    }
    assert!(book.is_empty());
}

#[test]
fn best_bid_less_than_best_ask_invariant_holds_after_valid_applies() {
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    book.apply(BookUpdate::new(Side::Sell, 101.0, 1.0)).unwrap();
    assert!(book.best_bid() < book.best_ask());
}

proptest::proptest! {
    #[test]
    fn sequence_never_decreases_across_arbitrary_single_side_updates(
        prices in proptest::collection::vec(1.0f64..1000.0, 1..50)
    ) {
        let mut book = OrderBook::new("X");
        let mut last = 0u64;
        for p in prices {
            // Stay single-sided (bids only) to avoid crossing.
            let _ = book.apply(BookUpdate::new(Side::Buy, p, 1.0));
            proptest::prop_assert!(book.sequence() >= last);
            last = book.sequence();
        }
    }
}
