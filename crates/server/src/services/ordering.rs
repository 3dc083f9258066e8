//! The order flow: resolve, take stock, enqueue, notify.
//!
//! Stock is the serialization point. The conditional decrement in the
//! database decides whether an order is accepted; only after it succeeds
//! does the order enter the queue, and only after that do notifications go
//! out. A crash between decrement and append loses at most one unit of
//! stock, never a queued order that was paid for in notifications.

use lastcall_core::Channel;

use crate::catalog::Resolution;
use crate::commands::AdminCommand;
use crate::error::AppError;
use crate::queue::{NewOrder, Order};
use crate::state::AppState;

/// A request to place an order, assembled by the intake handlers.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub channel: Channel,
    pub customer_ref: String,
    pub customer_name: String,
    pub text: String,
    pub client_tag: Option<String>,
}

/// Outcome of an order attempt that did not error.
#[derive(Debug)]
pub enum Placement {
    /// The order was accepted and queued.
    Accepted(Order),
    /// The message was channel-tutorial noise; no reply is owed.
    Ignored,
}

/// Run the full order flow for an inbound message.
///
/// # Errors
///
/// - `AppError::UnresolvedDrink` when the text matches no catalog entry
/// - `AppError::OutOfStock` when the drink's stock counter is at zero
/// - `AppError::Database` when the stock decrement fails
pub async fn place_order(state: &AppState, request: PlaceOrder) -> Result<Placement, AppError> {
    let catalog = state.catalog().snapshot();
    let (canonical_id, display_name, raw_text) = match catalog.resolve(&request.text) {
        Resolution::Drink(entry) => (
            entry.canonical_id.clone(),
            entry.display_name.clone(),
            crate::catalog::strip_order_prefix(&request.text).trim().to_string(),
        ),
        Resolution::Noise => return Ok(Placement::Ignored),
        Resolution::NotFound => return Err(AppError::UnresolvedDrink(request.text)),
    };
    drop(catalog);

    let taken = state
        .drinks()
        .try_decrement_by_canonical(&canonical_id)
        .await?;
    if taken.is_none() {
        return Err(AppError::OutOfStock(display_name));
    }

    let order = state.queue().append(NewOrder {
        channel: request.channel,
        customer_ref: request.customer_ref,
        customer_name: request.customer_name,
        canonical_id,
        display_name,
        raw_text,
        client_tag: request.client_tag,
    });

    tracing::info!(
        order_id = order.id.get(),
        drink = %order.canonical_id,
        channel = %order.channel,
        "order accepted"
    );

    state.dispatcher().order_received(&order).await;
    Ok(Placement::Accepted(order))
}

/// Serve the order with this stable id.
///
/// # Errors
///
/// Returns `AppError::NotFound` when no pending order has the id.
pub async fn serve_by_id(state: &AppState, id: lastcall_core::OrderId) -> Result<Order, AppError> {
    let order = state
        .queue()
        .remove_by_id(id)
        .ok_or_else(|| AppError::NotFound(format!("order {}", id.get())))?;
    tracing::info!(order_id = order.id.get(), "order served");
    state.dispatcher().order_ready(&order).await;
    Ok(order)
}

/// Serve the order at this 1-based queue position.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the position is out of range.
pub async fn serve_by_position(state: &AppState, position: usize) -> Result<Order, AppError> {
    let order = state
        .queue()
        .remove_by_position(position)
        .ok_or_else(|| AppError::NotFound(format!("queue position {position}")))?;
    tracing::info!(order_id = order.id.get(), position, "order served");
    state.dispatcher().order_ready(&order).await;
    Ok(order)
}

/// Remove every pending order. Stock already taken stays taken.
pub fn clear_queue(state: &AppState) -> usize {
    let count = state.queue().clear();
    tracing::info!(count, "queue cleared");
    state.dispatcher().queue_cleared(count);
    count
}

/// Execute an operator command and produce the text reply.
pub async fn run_admin_command(state: &AppState, command: AdminCommand) -> String {
    match command {
        AdminCommand::Queue => format_queue(&state.queue().list()),
        AdminCommand::Clear => {
            let count = clear_queue(state);
            format!("Cleared {count} order(s).")
        }
        AdminCommand::ServeByPosition(position) => match serve_by_position(state, position).await {
            Ok(order) => format!(
                "Served #{position}: {} for {}.",
                order.display_name, order.customer_name
            ),
            Err(_) => format!("No order at position {position}."),
        },
        AdminCommand::ServeById(id) => match serve_by_id(state, id).await {
            Ok(order) => format!(
                "Served order {}: {} for {}.",
                id.get(),
                order.display_name,
                order.customer_name
            ),
            Err(_) => format!("No pending order with id {}.", id.get()),
        },
    }
}

/// The `queue` command reply: one numbered line per pending order.
#[must_use]
pub fn format_queue(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "The queue is empty.".to_string();
    }
    let mut lines = vec![format!("{} pending order(s):", orders.len())];
    for (idx, order) in orders.iter().enumerate() {
        lines.push(format!(
            "#{} {} - {} (id {})",
            idx + 1,
            order.display_name,
            order.customer_name,
            order.id.get()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::OrderQueue;

    fn sample_queue() -> OrderQueue {
        let queue = OrderQueue::new();
        queue.append(NewOrder {
            channel: Channel::Whatsapp,
            customer_ref: "15551234567".into(),
            customer_name: "Ada".into(),
            canonical_id: "margarita".into(),
            display_name: "Margarita".into(),
            raw_text: "margarita".into(),
            client_tag: None,
        });
        queue.append(NewOrder {
            channel: Channel::Web,
            customer_ref: "tab-7".into(),
            customer_name: "Grace".into(),
            canonical_id: "negroni".into(),
            display_name: "Negroni".into(),
            raw_text: "negroni".into(),
            client_tag: Some("tab-7".into()),
        });
        queue
    }

    #[test]
    fn test_format_queue_empty() {
        assert_eq!(format_queue(&[]), "The queue is empty.");
    }

    #[test]
    fn test_format_queue_lists_positions_and_ids() {
        let queue = sample_queue();
        let reply = format_queue(&queue.list());
        assert!(reply.starts_with("2 pending order(s):"));
        assert!(reply.contains("#1 Margarita - Ada"));
        assert!(reply.contains("#2 Negroni - Grace"));
        assert!(reply.contains("(id "));
    }
}
