//! metalmap-mv library - Map Viewer service
//!
//! Serves the choropleth page and a JSON API over one shared map session.
//! Data loads in the background after the listener is up; until it
//! succeeds every data endpoint answers 503.

use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use metalmap_common::config::UiConfig;
use metalmap_common::events::EventBus;
use metalmap_common::Session;

pub mod api;
pub mod error;
pub mod loader;
pub mod notifier;

pub use error::ApiError;

/// Capacity of the event broadcast channel
const EVENT_BUS_CAPACITY: usize = 256;

/// Lifecycle of the map data
#[derive(Debug)]
pub enum LoadState {
    Loading,
    Ready(Box<Session>),
    /// Load failed; the service stays inert
    Failed(String),
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub load: Arc<RwLock<LoadState>>,
    pub event_bus: EventBus,
    pub ui: UiConfig,
}

impl AppState {
    /// State with data still loading
    pub fn new(ui: UiConfig) -> Self {
        Self::from_load(LoadState::Loading, ui)
    }

    /// State over an already loaded session
    pub fn with_session(session: Session, ui: UiConfig) -> Self {
        Self::from_load(LoadState::Ready(Box::new(session)), ui)
    }

    fn from_load(load: LoadState, ui: UiConfig) -> Self {
        Self {
            load: Arc::new(RwLock::new(load)),
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            ui,
        }
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(*self.load.read().await, LoadState::Ready(_))
    }

    /// Run `f` against the session, or fail with 503
    pub async fn read_session<T>(&self, f: impl FnOnce(&Session) -> T) -> Result<T, ApiError> {
        match &*self.load.read().await {
            LoadState::Ready(session) => Ok(f(session)),
            LoadState::Loading => Err(ApiError::NotLoaded("still loading".to_string())),
            LoadState::Failed(message) => Err(ApiError::NotLoaded(message.clone())),
        }
    }

    /// Run `f` against the session mutably, or fail with 503
    pub async fn write_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Result<T, ApiError> {
        match &mut *self.load.write().await {
            LoadState::Ready(session) => Ok(f(session)),
            LoadState::Loading => Err(ApiError::NotLoaded("still loading".to_string())),
            LoadState::Failed(message) => Err(ApiError::NotLoaded(message.clone())),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let data = Router::new()
        .route("/api/map", get(api::get_map))
        .route("/api/geometry", get(api::get_geometry))
        .route(
            "/api/filters",
            get(api::get_filters)
                .put(api::replace_filters)
                .patch(api::change_filter),
        )
        .route("/api/filters/reset", post(api::reset_filters))
        .route("/api/countries/:name", get(api::get_tooltip))
        .route("/api/countries/:name/open", post(api::open_country))
        .route("/api/modal", get(api::get_modal))
        .route("/api/modal/controls", put(api::set_modal_controls))
        .route("/api/modal/close", post(api::close_modal))
        .route("/api/search", post(api::search_band))
        .route("/api/keys", post(api::key_press))
        .route("/api/toast", get(api::get_toast))
        .route("/api/diagnostics/unresolved", get(api::unresolved_origins));

    let service = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/app.css", get(api::serve_app_css))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes());

    Router::new()
        .merge(data)
        .merge(service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
