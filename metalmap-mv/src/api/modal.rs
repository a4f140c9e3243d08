//! Drill-down modal endpoints

use axum::{extract::State, Json};
use metalmap_common::events::MapEvent;
use metalmap_common::modal::{ModalControls, ModalView};
use serde::Serialize;

use crate::{ApiError, AppState};

/// GET /api/modal
///
/// The open modal, or `null`.
pub async fn get_modal(State(state): State<AppState>) -> Result<Json<Option<ModalView>>, ApiError> {
    let view = state.read_session(|session| session.modal_view()).await?;
    Ok(Json(view))
}

/// PUT /api/modal/controls
///
/// Apply the in-modal search, status and style controls. Rows are
/// re-filtered, never re-sorted.
pub async fn set_modal_controls(
    State(state): State<AppState>,
    Json(controls): Json<ModalControls>,
) -> Result<Json<ModalView>, ApiError> {
    let view = state
        .write_session(|session| session.set_modal_controls(controls))
        .await?
        .ok_or_else(|| ApiError::NotFound("No modal is open".to_string()))?;

    state.event_bus.emit_lossy(MapEvent::ModalUpdated {
        visible_rows: view.rows.len(),
        timestamp: chrono::Utc::now(),
    });
    Ok(Json(view))
}

/// Response to a close request
#[derive(Debug, Serialize)]
pub struct CloseResponse {
    /// A modal was open and is now closed
    pub closed: bool,
}

/// POST /api/modal/close
pub async fn close_modal(State(state): State<AppState>) -> Result<Json<CloseResponse>, ApiError> {
    let closed = state.write_session(|session| session.close_modal()).await?;
    if closed {
        state.event_bus.emit_lossy(MapEvent::ModalClosed {
            timestamp: chrono::Utc::now(),
        });
    }
    Ok(Json(CloseResponse { closed }))
}
