//! Band-name search
//!
//! Resolves a free-text query to the first band (in load order) whose name
//! contains it, then checks that the band's country exists on the map.

use serde::Serialize;

use crate::band::BandRecord;
use crate::notify::escape_html;
use crate::topology::Atlas;

/// Outcome of a search, before any side effect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Blank query; nothing happens
    Empty,
    /// No band name contains the query
    NoMatch { query: String },
    /// Band found, but its country has no map feature
    UnmappedCountry { band: String, country: String },
    /// Band found on the map
    Found { index: usize, band: String, country: String },
}

impl SearchOutcome {
    /// Toast HTML for the soft-miss outcomes
    pub fn toast_html(&self) -> Option<String> {
        match self {
            SearchOutcome::NoMatch { query } => Some(format!(
                "No band found for \"<strong>{}</strong>\"",
                escape_html(query)
            )),
            SearchOutcome::UnmappedCountry { country, .. } => {
                let country = if country.is_empty() { "unknown" } else { country };
                Some(format!(
                    "No map feature for \"<strong>{}</strong>\"",
                    escape_html(country)
                ))
            }
            _ => None,
        }
    }
}

/// Index of the first record whose lowercased name contains the query
pub fn find_band(records: &[BandRecord], query: &str) -> Option<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    records
        .iter()
        .position(|r| r.name.to_lowercase().contains(&needle))
}

/// Run a search against the record set and atlas
///
/// `query` is the raw input; the no-match outcome keeps it untrimmed so the
/// toast shows exactly what was typed.
pub fn search(records: &[BandRecord], atlas: &Atlas, query: &str) -> SearchOutcome {
    if query.trim().is_empty() {
        return SearchOutcome::Empty;
    }

    let Some(index) = find_band(records, query) else {
        return SearchOutcome::NoMatch {
            query: query.to_string(),
        };
    };

    let record = &records[index];
    let country = record.origin_canonical.clone();
    if atlas.contains(&country) {
        SearchOutcome::Found {
            index,
            band: record.name.clone(),
            country,
        }
    } else {
        SearchOutcome::UnmappedCountry {
            band: record.name.clone(),
            country,
        }
    }
}
