//! Filter control endpoints
//!
//! Every change replaces the filter state, recomputes the aggregate and
//! publishes `FilterChanged` followed by `MapRecomputed`.

use axum::{extract::State, Json};
use metalmap_common::events::MapEvent;
use metalmap_common::filter::{FilterChange, FilterState};
use metalmap_common::session::{ControlSync, MapView, Session};
use serde::Serialize;
use tracing::debug;

use crate::{ApiError, AppState};

/// Response to a reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Values the controls must show
    pub controls: ControlSync,
    pub map: MapView,
}

/// GET /api/filters
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<FilterState>, ApiError> {
    let filter = state.read_session(|session| session.filter().clone()).await?;
    Ok(Json(filter))
}

/// PUT /api/filters
///
/// Replace the whole filter state.
pub async fn replace_filters(
    State(state): State<AppState>,
    Json(filter): Json<FilterState>,
) -> Result<Json<MapView>, ApiError> {
    let view = state
        .write_session(|session| {
            validate_subgenre(session, &filter)?;
            session.set_filter(filter);
            Ok::<_, ApiError>(session.map_view())
        })
        .await??;

    publish_recompute(&state, &view);
    Ok(Json(view))
}

/// PATCH /api/filters
///
/// Change one control: `{"field": "decade", "value": 1980}`.
pub async fn change_filter(
    State(state): State<AppState>,
    Json(change): Json<FilterChange>,
) -> Result<Json<MapView>, ApiError> {
    debug!("Filter change: {:?}", change);
    let view = state
        .write_session(|session| {
            let next = session.filter().with_change(change);
            validate_subgenre(session, &next)?;
            session.set_filter(next);
            Ok::<_, ApiError>(session.map_view())
        })
        .await??;

    publish_recompute(&state, &view);
    Ok(Json(view))
}

/// POST /api/filters/reset
pub async fn reset_filters(State(state): State<AppState>) -> Result<Json<ResetResponse>, ApiError> {
    let response = state
        .write_session(|session| {
            let controls = session.reset();
            ResetResponse {
                controls,
                map: session.map_view(),
            }
        })
        .await?;

    publish_recompute(&state, &response.map);
    Ok(Json(response))
}

/// Subgenres must be one of the dropdown options
fn validate_subgenre(session: &Session, filter: &FilterState) -> Result<(), ApiError> {
    match filter.subgenre.name() {
        Some(name) if !session.subgenres().iter().any(|s| s == name) => {
            Err(ApiError::BadRequest(format!("Unknown subgenre: {}", name)))
        }
        _ => Ok(()),
    }
}

/// Publish `FilterChanged` then `MapRecomputed` for a new map view
pub(crate) fn publish_recompute(state: &AppState, view: &MapView) {
    let now = chrono::Utc::now();
    state.event_bus.emit_lossy(MapEvent::FilterChanged {
        filter: view.filter.clone(),
        timestamp: now,
    });
    state.event_bus.emit_lossy(MapEvent::MapRecomputed {
        matching_bands: view.matching_bands,
        countries: view.countries.iter().filter(|c| !c.disabled).count(),
        max_count: view.max_count,
        timestamp: now,
    });
}
