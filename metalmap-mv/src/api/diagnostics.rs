//! Data quality diagnostics

use axum::{extract::State, Json};
use metalmap_common::session::UnresolvedOrigin;

use crate::{ApiError, AppState};

/// GET /api/diagnostics/unresolved
///
/// Band origins that resolve to no map feature, most bands first. These
/// bands are counted but never painted.
pub async fn unresolved_origins(
    State(state): State<AppState>,
) -> Result<Json<Vec<UnresolvedOrigin>>, ApiError> {
    let unresolved = state.read_session(|session| session.unresolved_origins()).await?;
    Ok(Json(unresolved))
}
