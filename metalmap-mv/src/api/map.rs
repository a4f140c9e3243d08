//! Map data endpoints

use axum::{extract::State, Json};
use metalmap_common::session::MapView;
use serde_json::Value;

use crate::{ApiError, AppState};

/// GET /api/map
///
/// Country fills, legends, badge and the filter control options for the
/// current filter state.
pub async fn get_map(State(state): State<AppState>) -> Result<Json<MapView>, ApiError> {
    let view = state.read_session(|session| session.map_view()).await?;
    Ok(Json(view))
}

/// GET /api/geometry
///
/// The atlas as a GeoJSON FeatureCollection in lon/lat. Features are keyed
/// by `properties.name`, the same names `/api/map` reports.
pub async fn get_geometry(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let geojson = state.read_session(|session| session.atlas().to_geojson()).await?;
    Ok(Json(geojson))
}
