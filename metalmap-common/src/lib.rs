//! # Metal Map Common Library
//!
//! Data pipeline and session state behind the metal band map:
//! - Band table loading and normalization
//! - Origin to map-country resolution
//! - World topology decoding
//! - Filters, aggregation and the color ramp
//! - Drill-down modal, search, toasts and keyboard shortcuts
//! - Event types and configuration loading

pub mod aggregate;
pub mod band;
pub mod color;
pub mod config;
pub mod country;
pub mod error;
pub mod events;
pub mod filter;
pub mod keyboard;
pub mod modal;
pub mod notify;
pub mod search;
pub mod session;
pub mod topology;

pub use error::{Error, Result};
pub use session::Session;
