//! The shared order queue.
//!
//! Accepted-but-not-served orders live here, in process memory, ordered by
//! creation time. Stock counts are the durable half of the state machine;
//! the queue is deliberately not persisted (see the top-level design notes).
//!
//! The queue is an injected service owned by [`crate::state::AppState`] and
//! constructed once at process start. A single mutex serializes mutations,
//! which is what gives the "at most one remove wins" guarantee: two admins
//! serving the same slot concurrently race on the lock, and the loser finds
//! the order already gone.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use lastcall_core::{Channel, OrderId};

/// An accepted order, owned by the queue until served or cleared.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Stable lookup key, monotonic, independent of queue position.
    pub id: OrderId,
    /// Surface the order arrived through.
    pub channel: Channel,
    /// Canonical phone number, or the client tag for web orders.
    pub customer_ref: String,
    /// First name from the channel profile, or the customer ref.
    pub customer_name: String,
    /// Canonical drink id resolved from the order text.
    pub canonical_id: String,
    /// Catalog display name at resolution time.
    pub display_name: String,
    /// The customer's own phrasing (polite prefix stripped), echoed in replies.
    pub raw_text: String,
    /// Accept time; the queue stays sorted by this.
    pub created_at: DateTime<Utc>,
    /// Browser-supplied tag for web push delivery.
    pub client_tag: Option<String>,
}

/// Fields the intake flow provides; id and timestamp are assigned on append.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub channel: Channel,
    pub customer_ref: String,
    pub customer_name: String,
    pub canonical_id: String,
    pub display_name: String,
    pub raw_text: String,
    pub client_tag: Option<String>,
}

/// Ordered collection of pending orders.
#[derive(Debug)]
pub struct OrderQueue {
    orders: Mutex<Vec<Order>>,
    next_id: AtomicI64,
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderQueue {
    /// Create an empty queue.
    ///
    /// Ids are seeded from the current wall clock in milliseconds so they
    /// stay unique across restarts (the queue itself does not survive one,
    /// but dashboards may hold ids from before).
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new order, assigning its id and timestamp.
    ///
    /// The ascending-`created_at` invariant is re-established on every
    /// append: the order is inserted at its sorted position rather than
    /// blindly pushed, in case timestamps race.
    pub fn append(&self, new: NewOrder) -> Order {
        let order = Order {
            id: OrderId::new(self.next_id.fetch_add(1, Ordering::Relaxed)),
            channel: new.channel,
            customer_ref: new.customer_ref,
            customer_name: new.customer_name,
            canonical_id: new.canonical_id,
            display_name: new.display_name,
            raw_text: new.raw_text,
            created_at: Utc::now(),
            client_tag: new.client_tag,
        };

        let mut orders = self.lock();
        let at = orders.partition_point(|o| (o.created_at, o.id) <= (order.created_at, order.id));
        orders.insert(at, order.clone());
        order
    }

    /// Remove an order by its stable id.
    ///
    /// Returns `None` if no such order is pending (e.g. a concurrent caller
    /// already served it).
    pub fn remove_by_id(&self, id: OrderId) -> Option<Order> {
        let mut orders = self.lock();
        let idx = orders.iter().position(|o| o.id == id)?;
        Some(orders.remove(idx))
    }

    /// Remove an order by 1-based queue position.
    ///
    /// Positions index the queue as it is at call time; they shift as
    /// orders are removed, which is why the dashboard and the `done id`
    /// command prefer stable ids.
    pub fn remove_by_position(&self, position: usize) -> Option<Order> {
        let mut orders = self.lock();
        if position == 0 || position > orders.len() {
            return None;
        }
        Some(orders.remove(position - 1))
    }

    /// Remove every pending order, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut orders = self.lock();
        let count = orders.len();
        orders.clear();
        count
    }

    /// Snapshot of pending orders in queue order.
    #[must_use]
    pub fn list(&self) -> Vec<Order> {
        self.lock().clone()
    }

    /// Number of pending orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_order(name: &str, canonical: &str) -> NewOrder {
        NewOrder {
            channel: Channel::Whatsapp,
            customer_ref: "15551234567".into(),
            customer_name: name.into(),
            canonical_id: canonical.into(),
            display_name: canonical.into(),
            raw_text: canonical.into(),
            client_tag: None,
        }
    }

    #[test]
    fn test_append_keeps_creation_order() {
        let queue = OrderQueue::new();
        let first = queue.append(new_order("Ada", "margarita"));
        let second = queue.append(new_order("Grace", "negroni"));
        assert!(first.created_at <= second.created_at);

        let listed: Vec<_> = queue.list().into_iter().map(|o| o.id).collect();
        assert_eq!(listed, vec![first.id, second.id]);
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let queue = OrderQueue::new();
        let a = queue.append(new_order("Ada", "margarita"));
        let b = queue.append(new_order("Grace", "negroni"));
        assert!(a.id < b.id);
    }

    #[test]
    fn test_remove_by_position_is_one_based() {
        let queue = OrderQueue::new();
        let first = queue.append(new_order("Ada", "margarita"));
        let second = queue.append(new_order("Grace", "negroni"));

        let served = queue.remove_by_position(1).unwrap();
        assert_eq!(served.id, first.id);

        let served = queue.remove_by_position(1).unwrap();
        assert_eq!(served.id, second.id);

        assert!(queue.remove_by_position(1).is_none());
        assert!(queue.remove_by_position(0).is_none());
    }

    #[test]
    fn test_remove_by_id_survives_reordering() {
        let queue = OrderQueue::new();
        let first = queue.append(new_order("Ada", "margarita"));
        let second = queue.append(new_order("Grace", "negroni"));

        // Serving the head shifts positions, but ids stay valid.
        queue.remove_by_position(1).unwrap();
        assert!(queue.remove_by_id(first.id).is_none());
        assert_eq!(queue.remove_by_id(second.id).unwrap().id, second.id);
    }

    #[test]
    fn test_clear_returns_count() {
        let queue = OrderQueue::new();
        queue.append(new_order("Ada", "margarita"));
        queue.append(new_order("Grace", "negroni"));
        queue.append(new_order("Edsger", "mojito"));
        assert_eq!(queue.clear(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_removes_only_one_wins() {
        use std::sync::Arc;

        let queue = Arc::new(OrderQueue::new());
        queue.append(new_order("Ada", "margarita"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let q = Arc::clone(&queue);
                std::thread::spawn(move || q.remove_by_position(1).is_some())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert!(queue.is_empty());
    }
}
