//! Transient notifications and the search pulse
//!
//! The toast channel holds at most one message. Every new message bumps the
//! channel generation; an auto-dismiss timer only clears the toast it was
//! started for, so a newer toast is never hidden early by an older timer.

use serde::Serialize;
use std::time::Duration;

/// Auto-dismiss delay of a toast
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(1400);

/// Duration of the search pulse animation
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(800);

/// Fill used when the pulsed country has no known fill
pub const PULSE_FALLBACK_FILL: &str = "#f5f5f5";

/// Pulse radius at start and end of the animation
pub const PULSE_RADIUS: [f64; 2] = [2.0, 26.0];

/// Escape text for inclusion in toast HTML
///
/// # Examples
/// ```
/// use metalmap_common::notify::escape_html;
///
/// assert_eq!(escape_html("<b>\"AC/DC\" & 'co'</b>"), "&lt;b&gt;&quot;AC/DC&quot; &amp; &#39;co&#39;&lt;/b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A visible toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Generation that produced this toast
    pub id: u64,
    /// Pre-escaped HTML
    pub html: String,
}

/// Single-slot notification channel
#[derive(Debug, Default)]
pub struct ToastChannel {
    current: Option<Toast>,
    generation: u64,
}

impl ToastChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast, replacing any visible one; returns its id
    pub fn show(&mut self, html: impl Into<String>) -> Toast {
        self.generation += 1;
        let toast = Toast {
            id: self.generation,
            html: html.into(),
        };
        self.current = Some(toast.clone());
        toast
    }

    /// Timer expiry for toast `id`; true if that toast was dismissed
    pub fn expire(&mut self, id: u64) -> bool {
        match &self.current {
            Some(toast) if toast.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}

/// Cosmetic pulse drawn at a country's centroid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pulse {
    pub country: String,
    /// `[lon, lat]`; the page projects it
    pub centroid: [f64; 2],
    pub fill: String,
    pub from_radius: f64,
    pub to_radius: f64,
    pub duration_ms: u64,
}

impl Pulse {
    pub fn new(country: &str, centroid: [f64; 2], fill: Option<String>, duration: Duration) -> Self {
        Self {
            country: country.to_string(),
            centroid,
            fill: fill.unwrap_or_else(|| PULSE_FALLBACK_FILL.to_string()),
            from_radius: PULSE_RADIUS[0],
            to_radius: PULSE_RADIUS[1],
            duration_ms: duration.as_millis() as u64,
        }
    }
}
