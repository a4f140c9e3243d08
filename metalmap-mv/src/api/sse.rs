//! Server-Sent Events (SSE) for map session events
//!
//! Every [`MapEvent`] on the bus is forwarded as an SSE message named after
//! its variant. A connection status message opens the stream.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use metalmap_common::events::{ConnectionStatus, MapEvent};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// GET /api/events - SSE event stream
///
/// Streams events:
/// - ConnectionStatus (on connect: `connected`, or `inert` without data)
/// - Every `MapEvent` (data load, filters, modal, toasts, pulses)
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to map events");

    let mut rx = state.event_bus.subscribe();
    let status = if state.is_loaded().await {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Inert
    };

    let stream = async_stream::stream! {
        yield Ok(connection_event(status));

        loop {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                received = rx.recv() => {
                    match received {
                        Ok(event) => {
                            if let Some(message) = to_sse(&event) {
                                yield Ok(message);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("SSE: Client lagged, {} events skipped", skipped);
                        }
                        Err(RecvError::Closed) => {
                            info!("SSE: Event bus closed, ending stream");
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

fn connection_event(status: ConnectionStatus) -> Event {
    let data = match status {
        ConnectionStatus::Connected => "connected",
        ConnectionStatus::Inert => "inert",
    };
    Event::default().event("ConnectionStatus").data(data)
}

fn to_sse(event: &MapEvent) -> Option<Event> {
    let event_type = event.event_type();
    match serde_json::to_string(event) {
        Ok(json) => {
            debug!("SSE: Broadcasting {}", event_type);
            Some(Event::default().event(event_type).data(json))
        }
        Err(e) => {
            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
            None
        }
    }
}
