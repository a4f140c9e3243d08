//! HTTP API handlers for metalmap-mv

pub mod buildinfo;
pub mod countries;
pub mod diagnostics;
pub mod filters;
pub mod health;
pub mod keys;
pub mod map;
pub mod modal;
pub mod search;
pub mod sse;
pub mod toast;
pub mod ui;

pub use buildinfo::get_build_info;
pub use countries::{get_tooltip, open_country};
pub use diagnostics::unresolved_origins;
pub use filters::{change_filter, get_filters, replace_filters, reset_filters};
pub use health::health_routes;
pub use keys::key_press;
pub use map::{get_geometry, get_map};
pub use modal::{close_modal, get_modal, set_modal_controls};
pub use search::search_band;
pub use sse::event_stream;
pub use toast::get_toast;
pub use ui::{serve_app_css, serve_app_js, serve_index};
