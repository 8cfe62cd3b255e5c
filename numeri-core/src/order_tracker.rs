//! Client-side order acknowledgement tracking.
//!
//! A small in-process convenience layered on top of the fill queue: tracks
//! an order's Ack -> Fill/Reject/Cancel progression in a table keyed by
//! `client_order_id`. An Algorithm that wants "what's the last known state
//! of the order I placed" reads [`OrderTracker`] rather than replaying the
//! fill queue itself.
//!
//! Built on `DashMap`, the same concurrent map the snapshot registry uses
//! (`crate::snapshot::BookRegistry`), since multiple Algorithm threads may
//! query it concurrently while the Execution Engine(s) that observe fills
//! update it.

use dashmap::DashMap;

use crate::model::{Fill, Status};

/// Tracks the last known [`Status`] per `client_order_id`.
#[derive(Default)]
pub struct OrderTracker {
    table: DashMap<String, Status>,
}

impl OrderTracker {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
        }
    }

    /// Records the status carried by an observed fill. Called by the
    /// component that drains the fill queue (typically the Algorithm that
    /// placed the order, or a shared dispatcher in front of it).
    pub fn record(&self, fill: &Fill) {
        self.table.insert(fill.client_order_id.clone(), fill.status);
    }

    /// The last known status for an order, if one has been observed.
    pub fn status(&self, client_order_id: &str) -> Option<Status> {
        self.table.get(client_order_id).map(|s| *s)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(id: &str, status: Status) -> Fill {
        Fill {
            client_order_id: id.to_string(),
            exchange_order_id: "ex-1".to_string(),
            status,
            filled_quantity: 1.0,
            filled_price: 100.0,
            timestamp_ns: 0,
        }
    }

    #[test]
    fn unknown_order_has_no_status() {
        let tracker = OrderTracker::new();
        assert_eq!(tracker.status("missing"), None);
    }

    #[test]
    fn tracker_records_latest_status_per_order() {
        let tracker = OrderTracker::new();
        tracker.record(&fill("abc", Status::Ack));
        assert_eq!(tracker.status("abc"), Some(Status::Ack));

        tracker.record(&fill("abc", Status::Fill));
        assert_eq!(tracker.status("abc"), Some(Status::Fill));
    }
}
