//! Toast endpoint

use axum::{extract::State, Json};
use metalmap_common::notify::Toast;

use crate::{ApiError, AppState};

/// GET /api/toast
///
/// The visible toast, or `null` once it has been dismissed.
pub async fn get_toast(State(state): State<AppState>) -> Result<Json<Option<Toast>>, ApiError> {
    let toast = state.read_session(|session| session.toast().cloned()).await?;
    Ok(Json(toast))
}
