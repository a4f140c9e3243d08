//! Toast and pulse side effects
//!
//! Toasts auto-dismiss after the configured delay. Each timer only clears the
//! toast it was started for, so a newer toast is never dismissed early.

use metalmap_common::events::MapEvent;
use metalmap_common::notify::{Pulse, Toast};
use tracing::debug;

use crate::AppState;

/// Publish a toast and start its dismiss timer
pub fn announce_toast(state: &AppState, toast: Toast) {
    let id = toast.id;
    state.event_bus.emit_lossy(MapEvent::ToastShown {
        toast,
        timestamp: chrono::Utc::now(),
    });

    let state = state.clone();
    let delay = state.ui.toast_duration();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        dismiss_toast(&state, id).await;
    });
}

/// Dismiss toast `id` if it is still the visible one
pub async fn dismiss_toast(state: &AppState, id: u64) -> bool {
    let dismissed = state
        .write_session(|session| session.expire_toast(id))
        .await
        .unwrap_or(false);

    if dismissed {
        debug!("Toast {} dismissed", id);
        state.event_bus.emit_lossy(MapEvent::ToastDismissed {
            id,
            timestamp: chrono::Utc::now(),
        });
    } else {
        debug!("Toast {} already superseded", id);
    }
    dismissed
}

/// Publish a search pulse; the page animates it
pub fn announce_pulse(state: &AppState, pulse: Pulse) {
    state.event_bus.emit_lossy(MapEvent::PulseStarted {
        pulse,
        timestamp: chrono::Utc::now(),
    });
}
