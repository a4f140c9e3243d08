//! Map filter state
//!
//! The three map filters (decade, activity status, subgenre) are held in one
//! immutable [`FilterState`] value. Control events build a new value and the
//! session swaps it in wholesale; nothing mutates a filter in place.
//!
//! JSON form mirrors the control values: `{"decade": "All" | 1980,
//! "status": "all" | "active" | "inactive", "subgenre": "All" | "Thrash"}`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::band::BandRecord;

/// Sentinel used by the decade and subgenre controls
pub const ALL: &str = "All";

/// Decade filter: `All` or a decade bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecadeFilter {
    #[default]
    All,
    Decade(i32),
}

/// Activity status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

/// Subgenre filter: `All` or one style tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubgenreFilter {
    #[default]
    All,
    Named(String),
}

/// Complete map filter selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub decade: DecadeFilter,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub subgenre: SubgenreFilter,
}

/// A single control change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "lowercase")]
pub enum FilterChange {
    Decade(DecadeFilter),
    Status(StatusFilter),
    Subgenre(SubgenreFilter),
}

impl DecadeFilter {
    pub fn matches(&self, record: &BandRecord) -> bool {
        match self {
            DecadeFilter::All => true,
            DecadeFilter::Decade(decade) => record.decade == *decade,
        }
    }
}

impl StatusFilter {
    /// Status predicate on an `is_active` flag
    pub fn matches_active(&self, is_active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => is_active,
            StatusFilter::Inactive => !is_active,
        }
    }

    pub fn matches(&self, record: &BandRecord) -> bool {
        self.matches_active(record.is_active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

impl SubgenreFilter {
    pub fn matches(&self, record: &BandRecord) -> bool {
        match self {
            SubgenreFilter::All => true,
            SubgenreFilter::Named(name) => record.has_subgenre(name),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SubgenreFilter::All => None,
            SubgenreFilter::Named(name) => Some(name),
        }
    }
}

impl FilterState {
    /// Conjunction of the three predicates; sentinels always match
    pub fn matches(&self, record: &BandRecord) -> bool {
        self.decade.matches(record) && self.status.matches(record) && self.subgenre.matches(record)
    }

    /// New state with one field replaced
    pub fn with_change(&self, change: FilterChange) -> Self {
        let mut next = self.clone();
        match change {
            FilterChange::Decade(decade) => next.decade = decade,
            FilterChange::Status(status) => next.status = status,
            FilterChange::Subgenre(subgenre) => next.subgenre = subgenre,
        }
        next
    }

    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    /// Labels of the active (non-sentinel) filters, e.g. `["1980s", "active"]`
    pub fn active_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let DecadeFilter::Decade(decade) = self.decade {
            labels.push(format!("{}s", decade));
        }
        if self.status != StatusFilter::All {
            labels.push(self.status.as_str().to_string());
        }
        if let Some(name) = self.subgenre.name() {
            labels.push(name.to_string());
        }
        labels
    }
}

// ========================================
// Control value (de)serialization
// ========================================

/// Control values arrive either as numbers or as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum ControlValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for DecadeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecadeFilter::All => f.write_str(ALL),
            DecadeFilter::Decade(decade) => write!(f, "{}", decade),
        }
    }
}

impl std::str::FromStr for DecadeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ALL {
            return Ok(DecadeFilter::All);
        }
        s.parse::<i32>()
            .map(DecadeFilter::Decade)
            .map_err(|_| format!("invalid decade: {}", s))
    }
}

impl Serialize for DecadeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecadeFilter::All => serializer.serialize_str(ALL),
            DecadeFilter::Decade(decade) => serializer.serialize_i32(*decade),
        }
    }
}

impl<'de> Deserialize<'de> for DecadeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ControlValue::deserialize(deserializer)? {
            ControlValue::Number(n) => i32::try_from(n)
                .map(DecadeFilter::Decade)
                .map_err(|_| de::Error::custom(format!("decade out of range: {}", n))),
            ControlValue::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl Serialize for SubgenreFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SubgenreFilter::All => serializer.serialize_str(ALL),
            SubgenreFilter::Named(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for SubgenreFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(if text == ALL {
            SubgenreFilter::All
        } else {
            SubgenreFilter::Named(text)
        })
    }
}
