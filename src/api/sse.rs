//! Server-Sent Events support

use crate::runtime::SessionEvent;
use crate::state_machine::Session;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Snapshot first, then every broadcast event
pub fn sse_stream(
    snapshot: Session,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(to_axum_event(
            "init",
            json!({ "type": "init", "session": snapshot }),
        ))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(session_event_to_axum(event))),
        Err(e) => {
            // Lagged; the next state event carries the full snapshot anyway
            tracing::debug!(error = %e, "SSE subscriber lagged");
            None
        }
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn session_event_to_axum(event: SessionEvent) -> Event {
    match event {
        SessionEvent::State { session } => {
            to_axum_event("state", json!({ "type": "state", "session": session }))
        }
        SessionEvent::Round { round } => {
            to_axum_event("round", json!({ "type": "round", "round": round }))
        }
        SessionEvent::Error { error } => {
            to_axum_event("error", json!({ "type": "error", "error": error }))
        }
    }
}

fn to_axum_event(event_type: &str, data: serde_json::Value) -> Event {
    Event::default().event(event_type).data(data.to_string())
}
