//! Country hover and click endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use metalmap_common::events::MapEvent;
use metalmap_common::modal::ModalView;
use metalmap_common::session::{Session, Tooltip};

use crate::{ApiError, AppState};

/// GET /api/countries/:name
///
/// Tooltip for a hovered country; `null` when it has no matching band.
pub async fn get_tooltip(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Option<Tooltip>>, ApiError> {
    let tooltip = state
        .read_session(|session| {
            require_feature(session, &name)?;
            Ok::<_, ApiError>(session.tooltip(&name))
        })
        .await??;
    Ok(Json(tooltip))
}

/// POST /api/countries/:name/open
///
/// Country click: opens the drill-down modal, or returns `null` when the
/// country has no matching band.
pub async fn open_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Option<ModalView>>, ApiError> {
    let view = state
        .write_session(|session| {
            require_feature(session, &name)?;
            Ok::<_, ApiError>(session.open_country(&name))
        })
        .await??;

    if let Some(view) = &view {
        state.event_bus.emit_lossy(MapEvent::ModalOpened {
            title: view.title.clone(),
            highlight_band: None,
            timestamp: chrono::Utc::now(),
        });
    }
    Ok(Json(view))
}

fn require_feature(session: &Session, name: &str) -> Result<(), ApiError> {
    if session.atlas().contains(name) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("No map feature named {}", name)))
    }
}
