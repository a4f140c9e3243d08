//! Map session
//!
//! Owns the loaded data and the UI state of one map page: the current filter,
//! its aggregate, the open modal and the toast channel. Every user action is
//! one method; each returns the data the page needs to repaint.
//!
//! The record set and atlas are immutable after load. The filter is replaced
//! wholesale and the aggregate fully recomputed on every change.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::aggregate::{recompute, Aggregate, CountryStats};
use crate::band::BandRecord;
use crate::color::{bubble_legend, color_legend, ColorRamp, LegendBubble, LegendRow};
use crate::filter::{DecadeFilter, FilterChange, FilterState, StatusFilter, SubgenreFilter, ALL};
use crate::keyboard::{shortcut_for, KeyAction, KeyPress};
use crate::modal::{distinct_styles, ModalControls, ModalRequest, ModalTable, ModalView, RowField};
use crate::notify::{escape_html, Pulse, Toast, ToastChannel, DEFAULT_PULSE_DURATION};
use crate::search::{search, SearchOutcome};
use crate::topology::Atlas;

/// Fill and count of one map feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryFill {
    pub name: String,
    pub count: usize,
    pub fill: String,
    /// No band matches the current filter
    pub disabled: bool,
}

/// Active-filters badge next to the reset button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterBadge {
    pub visible: bool,
    pub text: String,
    /// The reset button pulses while any filter is active
    pub reset_pulse: bool,
}

/// Everything the page needs to repaint the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub filter: FilterState,
    pub countries: Vec<CountryFill>,
    pub matching_bands: usize,
    pub max_count: usize,
    pub color_legend: Vec<LegendRow>,
    pub bubble_legend: Vec<LegendBubble>,
    pub badge: FilterBadge,
    pub decades: Vec<i32>,
    /// Subgenre dropdown options, `All` first
    pub subgenres: Vec<String>,
}

/// Values the filter controls must show for the current state
///
/// Applying it twice is the same as applying it once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSync {
    pub decade: DecadeFilter,
    pub status: StatusFilter,
    pub subgenre: SubgenreFilter,
    /// Text of the band search input
    pub search: String,
}

/// Hover tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub country: String,
    pub stats: CountryStats,
    pub html: String,
}

/// Result of a band search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub toast: Option<Toast>,
    pub modal: Option<ModalView>,
    pub pulse: Option<Pulse>,
}

/// Origin without a map feature, with its band count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedOrigin {
    pub name: String,
    pub bands: usize,
}

/// One map page worth of state
#[derive(Debug)]
pub struct Session {
    records: Vec<BandRecord>,
    atlas: Atlas,
    ramp: ColorRamp,
    filter: FilterState,
    aggregate: Aggregate,
    modal: Option<ModalTable>,
    toasts: ToastChannel,
    pulse_duration: Duration,
    decades: Vec<i32>,
    subgenres: Vec<String>,
}

impl Session {
    /// Start a session over loaded data with default filters
    pub fn new(records: Vec<BandRecord>, atlas: Atlas) -> Self {
        let filter = FilterState::default();
        let aggregate = recompute(&records, &filter);

        let mut decades: Vec<i32> = records.iter().map(|r| r.decade).collect();
        decades.sort_unstable();
        decades.dedup();
        let subgenres = std::iter::once(ALL.to_string())
            .chain(distinct_styles(&records))
            .collect();

        Self {
            records,
            atlas,
            ramp: ColorRamp::default(),
            filter,
            aggregate,
            modal: None,
            toasts: ToastChannel::new(),
            pulse_duration: DEFAULT_PULSE_DURATION,
            decades,
            subgenres,
        }
    }

    pub fn with_pulse_duration(mut self, duration: Duration) -> Self {
        self.pulse_duration = duration;
        self
    }

    pub fn records(&self) -> &[BandRecord] {
        &self.records
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Decades present in the data, ascending
    pub fn decades(&self) -> &[i32] {
        &self.decades
    }

    /// Subgenre dropdown options, `All` first
    pub fn subgenres(&self) -> &[String] {
        &self.subgenres
    }

    // ========================================
    // Filters
    // ========================================

    /// Replace the filter state and recompute
    pub fn set_filter(&mut self, filter: FilterState) -> &Aggregate {
        self.aggregate = recompute(&self.records, &filter);
        self.filter = filter;
        debug!(
            "Filter {:?}: {} matching bands in {} countries",
            self.filter,
            self.aggregate.filtered.len(),
            self.aggregate.counts.len()
        );
        &self.aggregate
    }

    /// Apply one control change
    pub fn apply_change(&mut self, change: FilterChange) -> &Aggregate {
        let next = self.filter.with_change(change);
        self.set_filter(next)
    }

    /// Reset every filter and report the control values to show
    pub fn reset(&mut self) -> ControlSync {
        self.set_filter(FilterState::default());
        self.control_sync()
    }

    /// Control values for the current filter; the search input is cleared
    pub fn control_sync(&self) -> ControlSync {
        ControlSync {
            decade: self.filter.decade,
            status: self.filter.status,
            subgenre: self.filter.subgenre.clone(),
            search: String::new(),
        }
    }

    // ========================================
    // Map view
    // ========================================

    /// Fills, legends and badge for the current aggregate
    pub fn map_view(&self) -> MapView {
        let max_count = self.aggregate.max_count();
        let countries = self
            .atlas
            .features()
            .map(|feature| {
                let count = self.aggregate.count(&feature.name);
                CountryFill {
                    name: feature.name.clone(),
                    count,
                    fill: self.ramp.fill(count, max_count),
                    disabled: count == 0,
                }
            })
            .collect();

        let labels = self.filter.active_labels();
        let badge = FilterBadge {
            visible: !labels.is_empty(),
            text: if labels.is_empty() {
                String::new()
            } else {
                format!("Filters: {}", labels.join(" · "))
            },
            reset_pulse: !labels.is_empty(),
        };

        MapView {
            filter: self.filter.clone(),
            countries,
            matching_bands: self.aggregate.filtered.len(),
            max_count,
            color_legend: color_legend(max_count),
            bubble_legend: bubble_legend(max_count, &self.ramp),
            badge,
            decades: self.decades.clone(),
            subgenres: self.subgenres.clone(),
        }
    }

    /// Hover tooltip, or `None` when the country has no matching band
    pub fn tooltip(&self, country: &str) -> Option<Tooltip> {
        let count = self.aggregate.count(country);
        if count == 0 {
            return None;
        }
        let stats = self.aggregate.country_stats(&self.records, country);

        let label = match self.filter.subgenre.name() {
            None => format!(
                "Bands: {}<br/>Active: {} &nbsp;•&nbsp; Inactive: {}",
                stats.total, stats.active, stats.inactive
            ),
            Some(subgenre) => format!("{}: {}", escape_html(subgenre), count),
        };

        Some(Tooltip {
            country: country.to_string(),
            stats,
            html: format!("<strong>{}</strong><br/>{}", escape_html(country), label),
        })
    }

    // ========================================
    // Modal
    // ========================================

    /// Country click: open the drill-down modal over the filtered bands
    ///
    /// With a subgenre filter active only that subgenre's bands are listed.
    /// Returns `None` (and leaves any open modal alone) when the country has
    /// no matching band.
    pub fn open_country(&mut self, country: &str) -> Option<ModalView> {
        let country_bands: Vec<BandRecord> = self
            .aggregate
            .country_records(&self.records, country)
            .into_iter()
            .cloned()
            .collect();
        if country_bands.is_empty() {
            return None;
        }

        let request = match self.filter.subgenre.name() {
            None => country_request(country, country_bands, None),
            Some(subgenre) => {
                let mut request = country_request(country, country_bands, None);
                request.title = format!("{} - {} bands", country, subgenre);
                request.records.retain(|r| r.has_subgenre(subgenre));
                request
            }
        };

        Some(self.open_modal(request))
    }

    /// Open (or replace) the modal with a fresh table
    pub fn open_modal(&mut self, request: ModalRequest) -> ModalView {
        let table = ModalTable::open(request);
        let view = table.view();
        self.modal = Some(table);
        view
    }

    pub fn modal_view(&self) -> Option<ModalView> {
        self.modal.as_ref().map(ModalTable::view)
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    /// Apply in-modal controls; `None` when no modal is open
    pub fn set_modal_controls(&mut self, controls: ModalControls) -> Option<ModalView> {
        let table = self.modal.as_mut()?;
        table.set_controls(controls);
        Some(table.view())
    }

    /// Close the modal; true if one was open
    pub fn close_modal(&mut self) -> bool {
        self.modal.take().is_some()
    }

    // ========================================
    // Search, keyboard, notifications
    // ========================================

    /// Band search
    ///
    /// Soft misses raise a toast. A hit opens the country modal over every
    /// band of that country (ignoring filters) with the band highlighted and
    /// produces a pulse at the country's centroid.
    pub fn search(&mut self, query: &str) -> SearchResult {
        let outcome = search(&self.records, &self.atlas, query);

        let mut result = SearchResult {
            outcome: outcome.clone(),
            toast: None,
            modal: None,
            pulse: None,
        };

        if let Some(html) = outcome.toast_html() {
            result.toast = Some(self.notify(html));
            return result;
        }

        if let SearchOutcome::Found { band, country, .. } = outcome {
            let country_bands: Vec<BandRecord> = self
                .records
                .iter()
                .filter(|r| r.origin_canonical == country)
                .cloned()
                .collect();
            result.modal = Some(self.open_modal(country_request(&country, country_bands, Some(band))));
            result.pulse = self.pulse_for(&country);
            if result.pulse.is_none() {
                debug!("No pulse for {}: feature has no centroid", country);
            }
        }

        result
    }

    /// Cosmetic pulse at a country's centroid
    pub fn pulse_for(&self, country: &str) -> Option<Pulse> {
        let centroid = self.atlas.get(country)?.centroid()?;
        let fill = self
            .ramp
            .fill(self.aggregate.count(country), self.aggregate.max_count());
        Some(Pulse::new(country, centroid, Some(fill), self.pulse_duration))
    }

    /// Handle a key press; returns the action performed, if any
    pub fn key_press(&mut self, press: &KeyPress) -> Option<KeyAction> {
        let action = shortcut_for(press)?;
        match action {
            KeyAction::CloseModal => {
                self.close_modal();
            }
            KeyAction::ResetFilters => {
                self.reset();
            }
        }
        Some(action)
    }

    /// Show a toast, superseding any visible one
    pub fn notify(&mut self, html: impl Into<String>) -> Toast {
        self.toasts.show(html)
    }

    /// Auto-dismiss timer fired for toast `id`
    pub fn expire_toast(&mut self, id: u64) -> bool {
        self.toasts.expire(id)
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toasts.current()
    }

    // ========================================
    // Diagnostics
    // ========================================

    /// Canonical origins that match no map feature, by band count
    pub fn unresolved_origins(&self) -> Vec<UnresolvedOrigin> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            if !self.atlas.contains(&record.origin_canonical) {
                *counts.entry(record.origin_canonical.as_str()).or_insert(0) += 1;
            }
        }

        let mut unresolved: Vec<UnresolvedOrigin> = counts
            .into_iter()
            .map(|(name, bands)| UnresolvedOrigin {
                name: name.to_string(),
                bands,
            })
            .collect();
        unresolved.sort_by(|a, b| b.bands.cmp(&a.bands).then_with(|| a.name.cmp(&b.name)));
        unresolved
    }
}

/// Modal request for a country's band list
fn country_request(country: &str, records: Vec<BandRecord>, highlight_band: Option<String>) -> ModalRequest {
    ModalRequest {
        title: format!("{} - bands", country),
        records,
        searchable: vec![RowField::Band, RowField::Styles],
        status_filter: true,
        highlight_band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::{normalize_row, RawBandRow};
    use crate::topology::CountryFeature;

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

    fn square(name: &str, x: f64) -> CountryFeature {
        CountryFeature {
            name: name.to_string(),
            polygons: vec![vec![vec![[x, 0.0], [x, 2.0], [x + 2.0, 2.0], [x + 2.0, 0.0], [x, 0.0]]]],
        }
    }

    fn session() -> Session {
        let records = vec![
            band("Metallica", "1981", "USA", "Heavy, Thrash", "-"),
            band("Slayer", "1981", "USA", "Thrash", "-"),
            band("Death", "1983", "USA", "Death", "2001"),
            band("Mayhem", "1984", "Norway", "Black", "-"),
            band("Emperor", "1991", "Norway", "Black, Symphonic", "2001"),
            band("Søulmate", "2004", "Norway", "Doom", "-"),
            band("Kreator", "1982", "Germany", "Thrash", "-"),
        ];
        let atlas = Atlas::from_features(vec![
            square("United States of America", 0.0),
            square("Norway", 10.0),
            square("Sweden", 20.0),
        ]);
        Session::new(records, atlas)
    }

    #[test]
    fn test_initial_view() {
        let session = session();
        let view = session.map_view();

        assert_eq!(view.matching_bands, 7);
        assert_eq!(view.max_count, 3);
        assert_eq!(view.decades, vec![1980, 1990, 2000]);
        assert_eq!(view.subgenres[0], "All");
        assert!(view.subgenres.contains(&"Thrash".to_string()));
        assert!(!view.badge.visible);

        let sweden = view.countries.iter().find(|c| c.name == "Sweden").unwrap();
        assert!(sweden.disabled);
        assert_eq!(sweden.fill, "#152715");
        let usa = view.countries.iter().find(|c| c.name == "United States of America").unwrap();
        assert_eq!(usa.fill, "#a3f5c1");
    }

    #[test]
    fn test_filter_change_recomputes() {
        let mut session = session();
        session.apply_change(FilterChange::Subgenre(SubgenreFilter::Named("Black".to_string())));

        assert_eq!(session.aggregate().count("Norway"), 2);
        assert_eq!(session.aggregate().count("United States of America"), 0);

        let view = session.map_view();
        assert!(view.badge.visible);
        assert_eq!(view.badge.text, "Filters: Black");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = session();
        session.set_filter(FilterState {
            decade: DecadeFilter::Decade(1980),
            status: StatusFilter::Inactive,
            subgenre: SubgenreFilter::Named("Death".to_string()),
        });
        assert_eq!(session.aggregate().filtered.len(), 1);

        let sync = session.reset();

        assert_eq!(session.filter(), &FilterState::default());
        assert_eq!(session.aggregate().filtered.len(), session.records().len());
        assert_eq!(sync.decade, DecadeFilter::All);
        assert_eq!(sync.status, StatusFilter::All);
        assert_eq!(sync.subgenre, SubgenreFilter::All);
        assert_eq!(sync, session.control_sync());
    }

    #[test]
    fn test_tooltip() {
        let mut session = session();
        let tip = session.tooltip("United States of America").unwrap();
        assert_eq!(tip.stats, CountryStats { total: 3, active: 2, inactive: 1 });
        assert!(tip.html.contains("Bands: 3"));
        assert!(session.tooltip("Sweden").is_none());

        session.apply_change(FilterChange::Subgenre(SubgenreFilter::Named("Thrash".to_string())));
        let tip = session.tooltip("United States of America").unwrap();
        assert!(tip.html.ends_with("Thrash: 2"));
    }

    #[test]
    fn test_open_country_uses_filtered_bands() {
        let mut session = session();
        session.apply_change(FilterChange::Status(StatusFilter::Active));

        let view = session.open_country("United States of America").unwrap();
        let names: Vec<&str> = view.rows.iter().map(|r| r.key.as_str()).collect();

        assert_eq!(names, vec!["Metallica", "Slayer"]);
        assert_eq!(view.title, "United States of America - bands");
        assert!(session.is_modal_open());
    }

    #[test]
    fn test_open_country_with_subgenre() {
        let mut session = session();
        session.apply_change(FilterChange::Subgenre(SubgenreFilter::Named("Black".to_string())));

        let view = session.open_country("Norway").unwrap();

        assert_eq!(view.title, "Norway - Black bands");
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.style_options, vec!["Black", "Symphonic"]);
    }

    #[test]
    fn test_open_empty_country_does_nothing() {
        let mut session = session();
        assert!(session.open_country("Sweden").is_none());
        assert!(!session.is_modal_open());
    }

    #[test]
    fn test_search_hit_opens_modal_and_pulses() {
        let mut session = session();
        session.apply_change(FilterChange::Decade(DecadeFilter::Decade(1990)));

        let result = session.search("soulmate");
        // Band lookup is a plain lowercase substring match without folding
        assert!(matches!(result.outcome, SearchOutcome::NoMatch { .. }));

        let result = session.search("søul");
        let modal = result.modal.expect("modal opened");

        // Search box is pre-filled with the band name, narrowing the table
        assert_eq!(modal.controls.search, "Søulmate");
        assert_eq!(modal.rows.len(), 1);
        assert!(modal.rows[0].highlight);
        assert_eq!(modal.focus.as_deref(), Some("Søulmate"));

        // Clearing the search shows every Norwegian band, ignoring the decade filter
        let cleared = session.set_modal_controls(ModalControls::default()).unwrap();
        assert_eq!(cleared.rows.len(), 3);

        let pulse = result.pulse.expect("pulse");
        assert_eq!(pulse.country, "Norway");
        assert!((pulse.centroid[0] - 11.0).abs() < 1e-9);
        assert!((pulse.centroid[1] - 1.0).abs() < 1e-9);
        assert!(result.toast.is_none());
    }

    #[test]
    fn test_search_miss_raises_toast_without_modal() {
        let mut session = session();
        let result = session.search("nonexistentband123");

        assert!(result.modal.is_none());
        assert!(result.pulse.is_none());
        assert!(!session.is_modal_open());
        let toast = result.toast.unwrap();
        assert!(toast.html.contains("nonexistentband123"));
        assert_eq!(session.toast(), Some(&toast));
    }

    #[test]
    fn test_search_unmapped_country() {
        let mut session = session();
        let result = session.search("kreator");

        assert!(matches!(result.outcome, SearchOutcome::UnmappedCountry { .. }));
        assert!(result.toast.unwrap().html.contains("Germany"));
        assert!(!session.is_modal_open());
    }

    #[test]
    fn test_modal_controls_and_close() {
        let mut session = session();
        assert!(session.set_modal_controls(ModalControls::default()).is_none());

        session.open_country("Norway").unwrap();
        let view = session
            .set_modal_controls(ModalControls {
                status: StatusFilter::Inactive,
                ..ModalControls::default()
            })
            .unwrap();
        assert_eq!(view.rows.len(), 1);

        assert!(session.close_modal());
        assert!(!session.close_modal());
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut session = session();
        session.open_country("Norway").unwrap();
        session.apply_change(FilterChange::Status(StatusFilter::Active));

        assert_eq!(session.key_press(&KeyPress::new("r").in_element("input")), None);
        assert_eq!(session.filter().status, StatusFilter::Active);

        assert_eq!(session.key_press(&KeyPress::new("r")), Some(KeyAction::ResetFilters));
        assert!(session.filter().is_default());

        assert_eq!(session.key_press(&KeyPress::new("Escape")), Some(KeyAction::CloseModal));
        assert!(!session.is_modal_open());
    }

    #[test]
    fn test_toast_expiry() {
        let mut session = session();
        let first = session.notify("one");
        let second = session.notify("two");

        assert!(!session.expire_toast(first.id));
        assert!(session.expire_toast(second.id));
        assert!(session.toast().is_none());
    }

    #[test]
    fn test_unresolved_origins() {
        let session = session();
        let unresolved = session.unresolved_origins();

        assert_eq!(
            unresolved,
            vec![UnresolvedOrigin {
                name: "Germany".to_string(),
                bands: 1
            }]
        );
    }
}
