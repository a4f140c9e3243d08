//! Drill-down band table
//!
//! A [`ModalTable`] is built once when the modal opens: rows are turned into
//! view-models and sorted by band name. Control changes (search text, status,
//! style) only re-filter the already sorted rows and produce a fresh
//! [`ModalView`]; nothing is re-sorted.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::band::BandRecord;
use crate::filter::StatusFilter;

/// Table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowField {
    Band,
    Formed,
    Styles,
    Status,
}

impl RowField {
    pub const ALL: [RowField; 4] = [RowField::Band, RowField::Formed, RowField::Styles, RowField::Status];

    pub fn label(&self) -> &'static str {
        match self {
            RowField::Band => "Band",
            RowField::Formed => "Formed",
            RowField::Styles => "Styles",
            RowField::Status => "Status",
        }
    }
}

/// Column header as sent to the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: RowField,
    pub label: &'static str,
}

/// Row view-model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRow {
    pub band: String,
    pub formed: i32,
    /// Styles joined for display
    pub styles: String,
    /// Styles in source order
    pub style_list: Vec<String>,
    pub status: String,
    #[serde(skip)]
    is_active: bool,
}

impl BandRow {
    pub fn from_record(record: &BandRecord) -> Self {
        Self {
            band: record.name.clone(),
            formed: record.formed_year,
            styles: record.subgenres.join(", "),
            style_list: record.subgenres.clone(),
            status: record.status_label(),
            is_active: record.is_active,
        }
    }

    /// Display text of one column
    pub fn field(&self, field: RowField) -> String {
        match field {
            RowField::Band => self.band.clone(),
            RowField::Formed => self.formed.to_string(),
            RowField::Styles => self.styles.clone(),
            RowField::Status => self.status.clone(),
        }
    }
}

/// In-modal control values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalControls {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
    /// `None` means every style
    #[serde(default)]
    pub style: Option<String>,
}

/// Everything needed to open a modal table
#[derive(Debug, Clone)]
pub struct ModalRequest {
    pub title: String,
    pub records: Vec<BandRecord>,
    /// Fields matched by the free-text search
    pub searchable: Vec<RowField>,
    pub status_filter: bool,
    pub highlight_band: Option<String>,
}

/// Visible state of an open modal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
    pub title: String,
    pub columns: Vec<Column>,
    pub controls: ModalControls,
    pub status_filter: bool,
    /// Empty when the style filter is not offered
    pub style_options: Vec<String>,
    pub rows: Vec<VisibleRow>,
    /// Key of the highlighted row to bring into view
    pub focus: Option<String>,
}

/// A row after filtering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRow {
    /// Stable key (band name)
    pub key: String,
    #[serde(flatten)]
    pub row: BandRow,
    pub highlight: bool,
}

/// Built table with its current controls
#[derive(Debug, Clone)]
pub struct ModalTable {
    title: String,
    rows: Vec<BandRow>,
    searchable: Vec<RowField>,
    status_filter: bool,
    style_options: Vec<String>,
    highlight: Option<String>,
    controls: ModalControls,
}

impl ModalTable {
    /// Build the table and reset controls
    ///
    /// When a highlight band is given the search field is pre-populated with
    /// that exact name.
    pub fn open(request: ModalRequest) -> Self {
        let mut rows: Vec<BandRow> = request.records.iter().map(BandRow::from_record).collect();
        rows.sort_by(|a, b| compare_names(&a.band, &b.band));

        let style_options = distinct_styles(&request.records);

        let controls = ModalControls {
            search: request.highlight_band.clone().unwrap_or_default(),
            ..ModalControls::default()
        };

        Self {
            title: request.title,
            rows,
            searchable: request.searchable,
            status_filter: request.status_filter,
            style_options,
            highlight: request.highlight_band.as_deref().map(fold_name),
            controls,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn controls(&self) -> &ModalControls {
        &self.controls
    }

    /// Replace the control values
    ///
    /// A style that is not offered (or any style when the style filter is
    /// hidden) is ignored, as is a status filter on a table without one.
    pub fn set_controls(&mut self, controls: ModalControls) {
        let style = controls
            .style
            .filter(|s| self.style_options.iter().any(|o| o == s));
        let status = if self.status_filter {
            controls.status
        } else {
            StatusFilter::All
        };
        self.controls = ModalControls {
            search: controls.search,
            status,
            style,
        };
    }

    /// Rows matching the current controls, in table order
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let term = fold_name(&self.controls.search);
        let mut highlighted = false;

        self.rows
            .iter()
            .filter(|row| self.matches_search(row, &term))
            .filter(|row| self.controls.status.matches_active(row.is_active))
            .filter(|row| match &self.controls.style {
                Some(style) => row.style_list.iter().any(|s| s == style),
                None => true,
            })
            .map(|row| {
                let highlight = !highlighted
                    && self
                        .highlight
                        .as_deref()
                        .is_some_and(|h| fold_name(&row.band) == h);
                highlighted |= highlight;
                VisibleRow {
                    key: row.band.clone(),
                    row: row.clone(),
                    highlight,
                }
            })
            .collect()
    }

    /// Current view
    pub fn view(&self) -> ModalView {
        let rows = self.visible_rows();
        let focus = rows.iter().find(|r| r.highlight).map(|r| r.key.clone());
        ModalView {
            title: self.title.clone(),
            columns: RowField::ALL
                .iter()
                .map(|&key| Column { key, label: key.label() })
                .collect(),
            controls: self.controls.clone(),
            status_filter: self.status_filter,
            style_options: self.style_options.clone(),
            rows,
            focus,
        }
    }

    fn matches_search(&self, row: &BandRow, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let fields: &[RowField] = if self.searchable.is_empty() {
            &RowField::ALL
        } else {
            &self.searchable
        };
        fields
            .iter()
            .any(|&f| fold_name(&row.field(f)).contains(term))
    }
}

/// Distinct styles of a record subset, sorted
pub fn distinct_styles(records: &[BandRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.subgenres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fold a band name for highlight matching
///
/// Trims, lowercases, decomposes (NFD) and drops combining marks. Latin
/// letters without a decomposition (`ø`, `ł`, ...) are mapped by hand.
///
/// # Examples
/// ```
/// use metalmap_common::modal::fold_name;
///
/// assert_eq!(fold_name("Mötley Crüe"), fold_name("motley crue"));
/// assert_eq!(fold_name(" Søulmate "), "soulmate");
/// ```
pub fn fold_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ø' => folded.push('o'),
            'đ' | 'ð' => folded.push('d'),
            'ł' => folded.push('l'),
            'ħ' => folded.push('h'),
            'ı' => folded.push('i'),
            'æ' => folded.push_str("ae"),
            'œ' => folded.push_str("oe"),
            'ß' => folded.push_str("ss"),
            _ => folded.push(c),
        }
    }
    folded
}

/// Band name order: folded comparison, raw string as tie-break
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold_name(a).cmp(&fold_name(b)).then_with(|| a.cmp(b))
}
