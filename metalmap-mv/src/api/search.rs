//! Band search endpoint

use axum::{extract::State, Json};
use metalmap_common::events::MapEvent;
use metalmap_common::session::SearchResult;
use serde::Deserialize;
use tracing::debug;

use crate::notifier::{announce_pulse, announce_toast};
use crate::{ApiError, AppState};

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /api/search
///
/// A miss is not an error: the response carries the toast that was shown.
/// A hit opens the country modal with the band highlighted and starts a
/// pulse at the country.
pub async fn search_band(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResult>, ApiError> {
    debug!("Search: {:?}", request.query);
    let result = state.write_session(|session| session.search(&request.query)).await?;

    if let Some(toast) = &result.toast {
        announce_toast(&state, toast.clone());
    }

    if let Some(modal) = &result.modal {
        state.event_bus.emit_lossy(MapEvent::ModalOpened {
            title: modal.title.clone(),
            highlight_band: modal.focus.clone(),
            timestamp: chrono::Utc::now(),
        });
    }

    if let Some(pulse) = &result.pulse {
        announce_pulse(&state, pulse.clone());
    }

    Ok(Json(result))
}
