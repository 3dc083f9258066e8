//! Integration tests for the order queue lifecycle.

use std::sync::Arc;

use lastcall_core::Channel;
use lastcall_server::queue::{NewOrder, Order, OrderQueue};

fn order_for(name: &str, drink: &str) -> NewOrder {
    NewOrder {
        channel: Channel::Whatsapp,
        customer_ref: "15551230000".to_string(),
        customer_name: name.to_string(),
        canonical_id: drink.to_string(),
        display_name: drink.to_string(),
        raw_text: drink.to_string(),
        client_tag: None,
    }
}

#[test]
fn test_fifo_listing_order() {
    let queue = OrderQueue::new();
    let ids: Vec<_> = ["Ada", "Grace", "Edsger"]
        .iter()
        .map(|name| queue.append(order_for(name, "negroni")).id)
        .collect();

    let listed: Vec<_> = queue.list().into_iter().map(|o| o.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn test_serving_shifts_positions_but_not_ids() {
    let queue = OrderQueue::new();
    let first = queue.append(order_for("Ada", "margarita"));
    let second = queue.append(order_for("Grace", "negroni"));
    let third = queue.append(order_for("Edsger", "mojito"));

    // Serve the head by position; the others move up.
    let served = queue
        .remove_by_position(1)
        .unwrap_or_else(|| panic!("head should exist"));
    assert_eq!(served.id, first.id);

    let listed: Vec<_> = queue.list().into_iter().map(|o| o.id).collect();
    assert_eq!(listed, vec![second.id, third.id]);

    // The stable id still targets the same order regardless of position.
    let served = queue
        .remove_by_id(third.id)
        .unwrap_or_else(|| panic!("third order should still be pending"));
    assert_eq!(served.customer_name, "Edsger");
}

#[test]
fn test_double_serve_loses_gracefully() {
    let queue = OrderQueue::new();
    let order = queue.append(order_for("Ada", "margarita"));

    assert!(queue.remove_by_id(order.id).is_some());
    // Second operator acting on a stale dashboard gets a miss, not a panic.
    assert!(queue.remove_by_id(order.id).is_none());
    assert!(queue.remove_by_position(1).is_none());
}

#[test]
fn test_clear_empties_without_touching_ids() {
    let queue = OrderQueue::new();
    queue.append(order_for("Ada", "margarita"));
    queue.append(order_for("Grace", "negroni"));
    assert_eq!(queue.clear(), 2);

    // Ids keep climbing after a clear.
    let next = queue.append(order_for("Edsger", "mojito"));
    assert!(queue.remove_by_id(next.id).is_some());
}

#[test]
fn test_concurrent_appends_all_land() {
    let queue = Arc::new(OrderQueue::new());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let q = Arc::clone(&queue);
            std::thread::spawn(move || q.append(order_for(&format!("guest-{i}"), "paloma")).id)
        })
        .collect();

    let mut ids: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("thread panicked")))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(queue.len(), 16);

    // Listing is sorted by accept time even under concurrency.
    let listed: Vec<Order> = queue.list();
    for pair in listed.windows(2) {
        assert!((pair[0].created_at, pair[0].id) <= (pair[1].created_at, pair[1].id));
    }
}
