//! Band records and table import
//!
//! Raw rows come from the band CSV (`band_name, formed, origin, style, split`).
//! Each row is normalized into an immutable [`BandRecord`]; rows without a
//! usable formation year are dropped.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::country::{normalize_origin_name, origin_to_world_name};
use crate::Result;

/// Split markers that mean "still active"
const ACTIVE_MARKERS: [&str; 2] = ["-", "–"];

/// One row of the band table as found on disk
///
/// Every column is optional so that malformed rows reach the normalizer
/// instead of failing the whole import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBandRow {
    #[serde(default)]
    pub band_name: Option<String>,
    #[serde(default)]
    pub formed: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub split: Option<String>,
}

/// Normalized band record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRecord {
    pub name: String,
    pub formed_year: i32,
    /// `floor(formed_year / 10) * 10`
    pub decade: i32,
    pub origin_raw: String,
    /// Origin after country name resolution (may not match any atlas feature)
    pub origin_canonical: String,
    /// Styles in source order, duplicates kept
    pub subgenres: Vec<String>,
    pub is_active: bool,
    /// Split marker of inactive bands (usually the year they split)
    pub split_reason: Option<String>,
}

impl BandRecord {
    /// Whether the record carries the given style
    pub fn has_subgenre(&self, subgenre: &str) -> bool {
        self.subgenres.iter().any(|s| s == subgenre)
    }

    /// Display status: `Active` or `Inactive (<reason>)`
    pub fn status_label(&self) -> String {
        if self.is_active {
            "Active".to_string()
        } else {
            match &self.split_reason {
                Some(reason) => format!("Inactive ({})", reason),
                None => "Inactive".to_string(),
            }
        }
    }
}

/// Normalize one raw row, or `None` when it has no valid formation year
pub fn normalize_row(row: RawBandRow) -> Option<BandRecord> {
    let formed_year = parse_formed(row.formed.as_deref()?)?;

    let origin_raw = row.origin.unwrap_or_default();
    let origin_main = normalize_origin_name(&origin_raw);
    let origin_canonical = origin_to_world_name(&origin_main);

    let split = row.split.unwrap_or_default().trim().to_string();
    let is_active = ACTIVE_MARKERS.contains(&split.as_str());
    let split_reason = if is_active || split.is_empty() {
        None
    } else {
        Some(split)
    };

    Some(BandRecord {
        name: row.band_name.unwrap_or_default(),
        formed_year,
        decade: decade_of(formed_year),
        origin_raw,
        origin_canonical,
        subgenres: parse_styles(row.style.as_deref().unwrap_or("")),
        is_active,
        split_reason,
    })
}

/// Decade bucket of a year
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Split a style field on commas, trimming and dropping empties
pub fn parse_styles(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse the `formed` column
///
/// Zero counts as missing: the data set uses it as a placeholder. Years that
/// cannot be bucketed into an `i32` decade are rejected.
fn parse_formed(field: &str) -> Option<i32> {
    let value: f64 = field.trim().parse().ok()?;
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    let year = value.trunc();
    if year < f64::from(i32::MIN + 10) || year > f64::from(i32::MAX) {
        return None;
    }
    Some(year as i32)
}

/// Read and normalize every row of a band CSV
///
/// Records are returned in file order. Rows that fail to deserialize or lack
/// a formation year are dropped.
pub fn load_bands<R: Read>(reader: R) -> Result<Vec<BandRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    // Fail early on an unreadable header row
    csv_reader.headers()?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in csv_reader.deserialize::<RawBandRow>() {
        match row.ok().and_then(normalize_row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    debug!(
        "Loaded {} band records ({} rows dropped)",
        records.len(),
        dropped
    );

    Ok(records)
}

/// Load a band CSV from disk
pub fn load_bands_file(path: &Path) -> Result<Vec<BandRecord>> {
    let file = std::fs::File::open(path)?;
    load_bands(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, formed: &str, origin: &str, style: &str, split: &str) -> RawBandRow {
        RawBandRow {
            band_name: Some(name.to_string()),
            formed: Some(formed.to_string()),
            origin: Some(origin.to_string()),
            style: Some(style.to_string()),
            split: Some(split.to_string()),
        }
    }

    #[test]
    fn test_normalize_active_band() {
        let record = normalize_row(raw("Opeth", "1990", "Sweden", "Extreme progressive, Progressive rock", "-"))
            .expect("valid row");

        assert_eq!(record.name, "Opeth");
        assert_eq!(record.formed_year, 1990);
        assert_eq!(record.decade, 1990);
        assert_eq!(record.origin_canonical, "Sweden");
        assert_eq!(record.subgenres, vec!["Extreme progressive", "Progressive rock"]);
        assert!(record.is_active);
        assert_eq!(record.split_reason, None);
        assert_eq!(record.status_label(), "Active");
    }

    #[test]
    fn test_normalize_split_band() {
        let record = normalize_row(raw("Death", "1983", "USA", "Death", "2001")).expect("valid row");

        assert!(!record.is_active);
        assert_eq!(record.split_reason.as_deref(), Some("2001"));
        assert_eq!(record.status_label(), "Inactive (2001)");
        assert_eq!(record.origin_canonical, "United States of America");
        assert_eq!(record.origin_raw, "USA");
    }

    #[test]
    fn test_en_dash_marks_active() {
        let record = normalize_row(raw("X", "2001", "Finland", "Doom", "–")).unwrap();
        assert!(record.is_active);
    }

    #[test]
    fn test_missing_split_is_inactive_without_reason() {
        let record = normalize_row(raw("X", "2001", "Finland", "Doom", "")).unwrap();
        assert!(!record.is_active);
        assert_eq!(record.status_label(), "Inactive");
    }

    #[test]
    fn test_rows_without_year_are_dropped() {
        assert!(normalize_row(raw("A", "-", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "0", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "NaN", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "inf", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(RawBandRow::default()).is_none());
    }

    #[test]
    fn test_out_of_range_year_is_dropped() {
        assert!(normalize_row(raw("A", "-1e10", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "1e10", "Norway", "Black", "-")).is_none());
        assert!(normalize_row(raw("A", "-2147483648", "Norway", "Black", "-")).is_none());

        let csv = "band_name,formed,origin,split,style\nB,-3000000000,Norway,-,Black\nOk,1990,Norway,-,Black\n";
        let records = load_bands(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ok");
        assert_eq!(records[0].decade, 1990);
    }

    #[test]
    fn test_decade_bucket() {
        for year in [1964, 1970, 1979, 1999, 2016] {
            let decade = decade_of(year);
            assert_eq!(decade % 10, 0);
            assert!(decade <= year);
            assert!(year - decade < 10);
        }
        assert_eq!(decade_of(1987), 1980);
    }

    #[test]
    fn test_fractional_year_is_truncated() {
        let record = normalize_row(raw("A", "1989.7", "Norway", "Black", "-")).unwrap();
        assert_eq!(record.formed_year, 1989);
        assert_eq!(record.decade, 1980);
    }

    #[test]
    fn test_style_duplicates_are_kept() {
        assert_eq!(
            parse_styles("Heavy, , Thrash,Heavy "),
            vec!["Heavy", "Thrash", "Heavy"]
        );
        assert!(parse_styles("").is_empty());
    }

    #[test]
    fn test_load_bands_from_csv() {
        let csv = "\
,band_name,fans,formed,origin,split,style
0,Iron Maiden,4195,1975,United Kingdom,-,\"New wave of british heavy,Heavy\"
1,Nameless,10,-,Sweden,-,Death
2,Death,1818,1983,USA,2001,\"Death,Progressive death\"
";
        let records = load_bands(csv.as_bytes()).expect("csv parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Iron Maiden");
        assert_eq!(records[0].subgenres, vec!["New wave of british heavy", "Heavy"]);
        assert_eq!(records[1].name, "Death");
        assert_eq!(records[1].decade, 1980);
    }

    #[test]
    fn test_load_bands_tolerates_missing_columns() {
        let csv = "band_name,formed\nBathory,1983\n";
        let records = load_bands(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin_canonical, "");
        assert!(records[0].subgenres.is_empty());
        assert!(!records[0].is_active);
    }
}
