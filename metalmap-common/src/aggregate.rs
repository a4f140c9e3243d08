//! Filter aggregation
//!
//! [`recompute`] turns the record set and a [`FilterState`] into the filtered
//! subset and the per-country count map. It is pure: callers decide when to
//! repaint with the result.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::band::BandRecord;
use crate::filter::FilterState;

/// Result of one recompute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Indexes (into the record slice) of records matching the filter, in load order
    pub filtered: Vec<usize>,
    /// Canonical country name -> matching record count; zero counts are absent
    pub counts: BTreeMap<String, usize>,
}

impl Aggregate {
    /// Largest country count, or 1 when nothing matches
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(1)
    }

    pub fn count(&self, country: &str) -> usize {
        self.counts.get(country).copied().unwrap_or(0)
    }

    /// Normalized intensity used for the fill color
    pub fn intensity(&self, country: &str) -> f64 {
        self.count(country) as f64 / self.max_count() as f64
    }

    /// Filtered records, in load order
    pub fn records<'a>(&'a self, records: &'a [BandRecord]) -> impl Iterator<Item = &'a BandRecord> + 'a {
        self.filtered.iter().filter_map(move |&i| records.get(i))
    }

    /// Filtered records of one country, in load order
    pub fn country_records<'a>(&'a self, records: &'a [BandRecord], country: &'a str) -> Vec<&'a BandRecord> {
        self.records(records)
            .filter(|r| r.origin_canonical == country)
            .collect()
    }

    /// Status breakdown of one country under the current filter
    pub fn country_stats(&self, records: &[BandRecord], country: &str) -> CountryStats {
        self.records(records)
            .filter(|r| r.origin_canonical == country)
            .fold(CountryStats::default(), |mut acc, r| {
                acc.total += 1;
                if r.is_active {
                    acc.active += 1;
                } else {
                    acc.inactive += 1;
                }
                acc
            })
    }
}

/// Per-country status breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountryStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// Filter the records and count matches per canonical country
pub fn recompute(records: &[BandRecord], filter: &FilterState) -> Aggregate {
    let filtered: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(i, _)| i)
        .collect();

    let mut counts = BTreeMap::new();
    for &i in &filtered {
        *counts.entry(records[i].origin_canonical.clone()).or_insert(0) += 1;
    }

    Aggregate { filtered, counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::{normalize_row, RawBandRow};
    use crate::filter::{DecadeFilter, StatusFilter, SubgenreFilter};

    fn band(name: &str, formed: &str, origin: &str, style: &str, split: &str) -> BandRecord {
        normalize_row(RawBandRow {
            band_name: Some(name.to_string()),
            formed: Some(formed.to_string()),
            origin: Some(origin.to_string()),
            style: Some(style.to_string()),
            split: Some(split.to_string()),
        })
        .unwrap()
    }

    fn fixture() -> Vec<BandRecord> {
        vec![
            band("Metallica", "1981", "USA", "Heavy, Thrash", "-"),
            band("Slayer", "1981", "USA", "Thrash", "-"),
            band("Death", "1983", "USA", "Death", "2001"),
            band("Mayhem", "1984", "Norway", "Black", "-"),
            band("Emperor", "1991", "Norway", "Black", "2001"),
            band("Opeth", "1990", "Sweden", "Progressive death", "-"),
        ]
    }

    #[test]
    fn test_default_filter_counts_everything() {
        let records = fixture();
        let agg = recompute(&records, &FilterState::default());

        assert_eq!(agg.filtered.len(), records.len());
        assert_eq!(agg.count("United States of America"), 3);
        assert_eq!(agg.count("Norway"), 2);
        assert_eq!(agg.count("Sweden"), 1);
        assert_eq!(agg.max_count(), 3);
    }

    #[test]
    fn test_empty_decade_yields_empty_counts() {
        let records = fixture();
        let filter = FilterState {
            decade: DecadeFilter::Decade(1960),
            ..FilterState::default()
        };
        let agg = recompute(&records, &filter);

        assert!(agg.filtered.is_empty());
        assert!(agg.counts.is_empty());
        assert_eq!(agg.max_count(), 1);
        assert_eq!(agg.intensity("Norway"), 0.0);
    }

    #[test]
    fn test_zero_count_keys_are_absent() {
        let records = fixture();
        let filter = FilterState {
            subgenre: SubgenreFilter::Named("Black".to_string()),
            ..FilterState::default()
        };
        let agg = recompute(&records, &filter);

        assert_eq!(agg.counts.len(), 1);
        assert!(!agg.counts.contains_key("United States of America"));
    }

    #[test]
    fn test_conjunction_matches_independent_predicates() {
        let records = fixture();
        let filter = FilterState {
            decade: DecadeFilter::Decade(1980),
            status: StatusFilter::Active,
            subgenre: SubgenreFilter::Named("Thrash".to_string()),
        };
        let agg = recompute(&records, &filter);

        for (i, record) in records.iter().enumerate() {
            let expected = filter.decade.matches(record)
                && filter.status.matches(record)
                && filter.subgenre.matches(record);
            assert_eq!(agg.filtered.contains(&i), expected, "record {}", record.name);
        }
        assert_eq!(agg.count("United States of America"), 2);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let records = fixture();
        let filter = FilterState {
            status: StatusFilter::Inactive,
            ..FilterState::default()
        };
        assert_eq!(recompute(&records, &filter), recompute(&records, &filter));
    }

    #[test]
    fn test_unresolved_origins_are_counted_under_their_own_name() {
        let mut records = fixture();
        records.push(band("Ghost Band", "1999", "Wakanda", "Power", "-"));
        let agg = recompute(&records, &FilterState::default());

        assert_eq!(agg.count("Wakanda"), 1);
    }

    #[test]
    fn test_country_stats() {
        let records = fixture();
        let agg = recompute(&records, &FilterState::default());
        let stats = agg.country_stats(&records, "United States of America");

        assert_eq!(stats, CountryStats { total: 3, active: 2, inactive: 1 });
        assert_eq!(agg.country_stats(&records, "Atlantis"), CountryStats::default());
    }

    #[test]
    fn test_country_records_keep_load_order() {
        let records = fixture();
        let agg = recompute(&records, &FilterState::default());
        let names: Vec<&str> = agg
            .country_records(&records, "Norway")
            .iter()
            .map(|r| r.name.as_str())
            .collect();

        assert_eq!(names, vec!["Mayhem", "Emperor"]);
    }
}
