//! Server-sent events stream for live dashboards.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

/// GET /events - queue transitions as SSE.
///
/// A slow consumer that falls behind the broadcast buffer misses events
/// rather than stalling the queue; dashboards refetch the full queue on
/// reconnect anyway.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.dispatcher().subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match Event::default().json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize queue event");
                None
            }
        },
        // Lagged receiver: skip, the client catches up from the next event.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
