//! Wire-level data types shared across queues and plugins.
//!
//! These are the values that cross queue boundaries: [`OrderRequest`] flows
//! Algorithm -> Execution, [`Fill`] flows Execution -> Algorithm, [`Metric`]
//! flows Ingestor/Algorithm -> anyone consuming the metrics queue.

use serde::{Deserialize, Serialize};

/// Which side of the book an update or order applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side, used when looking up the far touch.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Lifecycle status of a submitted order, as reported by an Execution Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ack,
    Fill,
    Reject,
    Cancel,
}

/// The kind of derived signal carried by a [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    MidPrice,
    Imbalance,
    VWAP,
    Depth10,
}

/// A single price/quantity pair. A level with `quantity <= 0` denotes a
/// deletion at `price`, per the apply semantics in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

impl PriceLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }

    /// Whether this level represents a removal of `price` from the book.
    pub fn is_deletion(&self) -> bool {
        self.quantity <= 0.0
    }
}

/// An order an Algorithm wants executed, pushed onto the order queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
    pub client_order_id: String,
    pub timestamp_ns: u64,
}

/// An execution result pushed onto the fill queue by an Execution Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub client_order_id: String,
    pub exchange_order_id: String,
    pub status: Status,
    pub filled_quantity: f64,
    pub filled_price: f64,
    pub timestamp_ns: u64,
}

/// A derived signal pushed onto the metrics queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub symbol: String,
    pub kind: MetricKind,
    pub value: f64,
    pub timestamp_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_level_deletion() {
        assert!(PriceLevel::new(100.0, 0.0).is_deletion());
        assert!(PriceLevel::new(100.0, -1.0).is_deletion());
        assert!(!PriceLevel::new(100.0, 0.5).is_deletion());
    }

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite().opposite(), Side::Sell);
    }
}
