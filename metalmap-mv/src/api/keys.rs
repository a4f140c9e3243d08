//! Keyboard shortcut endpoint

use axum::{extract::State, Json};
use metalmap_common::events::MapEvent;
use metalmap_common::keyboard::{KeyAction, KeyPress};
use serde::Serialize;

use super::filters::publish_recompute;
use crate::{ApiError, AppState};

/// Shortcut outcome
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    /// Action performed, `null` when the key is not a shortcut here
    pub action: Option<KeyAction>,
}

/// POST /api/keys
///
/// `Escape` closes the modal. `r`/`R` resets the filters unless the key was
/// typed into an editable element.
pub async fn key_press(
    State(state): State<AppState>,
    Json(press): Json<KeyPress>,
) -> Result<Json<KeyResponse>, ApiError> {
    if press.key.is_empty() {
        return Err(ApiError::BadRequest("Missing key".to_string()));
    }

    let (action, map) = state
        .write_session(|session| {
            let was_open = session.is_modal_open();
            let action = session.key_press(&press);
            let map = match action {
                Some(KeyAction::ResetFilters) => Some(session.map_view()),
                Some(KeyAction::CloseModal) if !was_open => return (None, None),
                _ => None,
            };
            (action, map)
        })
        .await?;

    if action == Some(KeyAction::CloseModal) {
        state.event_bus.emit_lossy(MapEvent::ModalClosed {
            timestamp: chrono::Utc::now(),
        });
    }
    if let Some(map) = &map {
        publish_recompute(&state, map);
    }

    Ok(Json(KeyResponse { action }))
}
