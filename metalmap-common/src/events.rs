//! Event types for the map session
//!
//! Every visible state change of the session is published as a [`MapEvent`]
//! on the [`EventBus`]. The viewer forwards them to the page over SSE.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::filter::FilterState;
use crate::notify::{Pulse, Toast};

/// Map session events
///
/// Serialized with a `type` tag so the page can dispatch on it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MapEvent {
    /// Both data sources loaded
    DataLoaded {
        bands: usize,
        countries: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A data source failed; the session stays inert
    LoadFailed {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Filter state replaced
    FilterChanged {
        filter: FilterState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Country counts recomputed; the page should repaint
    MapRecomputed {
        matching_bands: usize,
        countries: usize,
        max_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Modal opened with a fresh table
    ModalOpened {
        title: String,
        highlight_band: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Modal controls changed
    ModalUpdated {
        visible_rows: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Modal closed
    ModalClosed {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Toast shown
    ToastShown {
        toast: Toast,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Toast auto-dismissed
    ToastDismissed {
        id: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Search pulse started (fire-and-forget)
    PulseStarted {
        pulse: Pulse,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MapEvent {
    /// Get event type as string for SSE event names
    pub fn event_type(&self) -> &str {
        match self {
            MapEvent::DataLoaded { .. } => "DataLoaded",
            MapEvent::LoadFailed { .. } => "LoadFailed",
            MapEvent::FilterChanged { .. } => "FilterChanged",
            MapEvent::MapRecomputed { .. } => "MapRecomputed",
            MapEvent::ModalOpened { .. } => "ModalOpened",
            MapEvent::ModalUpdated { .. } => "ModalUpdated",
            MapEvent::ModalClosed { .. } => "ModalClosed",
            MapEvent::ToastShown { .. } => "ToastShown",
            MapEvent::ToastDismissed { .. } => "ToastDismissed",
            MapEvent::PulseStarted { .. } => "PulseStarted",
        }
    }
}

/// Connection status pushed to SSE clients on connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Inert,
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers (one per open page)
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use metalmap_common::events::{EventBus, MapEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(MapEvent::ModalClosed { timestamp: chrono::Utc::now() });
/// assert_eq!(rx.try_recv().unwrap().event_type(), "ModalClosed");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MapEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MapEvent) {
        let _ = self.tx.send(event);
    }
}
