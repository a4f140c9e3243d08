//! End-to-end tests over the data pipeline
//!
//! Loads an inline band CSV and topology, then drives a session through the
//! interactions a page performs: filtering, hover, drill-down, search and
//! reset.

use metalmap_common::band::load_bands;
use metalmap_common::filter::{DecadeFilter, FilterChange, FilterState, StatusFilter, SubgenreFilter};
use metalmap_common::keyboard::{KeyAction, KeyPress};
use metalmap_common::search::SearchOutcome;
use metalmap_common::topology::Atlas;
use metalmap_common::Session;

const BANDS_CSV: &str = "\
,band_name,fans,formed,origin,split,style
0,Iron Maiden,4195,1975,United Kingdom,-,\"New wave of british heavy,Heavy\"
1,Opeth,4147,1990,Sweden,-,\"Extreme progressive,Progressive rock,Progressive\"
2,Metallica,3712,1981,USA,-,\"Heavy,Bay area thrash\"
3,Megadeth,3105,1983,USA,1983,\"Thrash,Heavy,Hard rock\"
4,Amon Amarth,3054,1988,Sweden,-,Melodic death
5,Slayer,2955,1981,USA,1981,Thrash
6,Death,2690,1983,USA,2001,\"Progressive death,Death,Progressive thrash\"
7,Dark Tranquillity,2463,1989,Sweden,-,Melodic death
8,Nameless,10,-,Sweden,-,Heavy
9,Kreator,1500,1982,Germany,-,Thrash
10,Children of Bodom,2100,1993,Finland,2019,Melodic death
";

const WORLD: &str = r#"{
    "type": "Topology",
    "arcs": [
        [[0, 50], [0, 58], [2, 58], [2, 50], [0, 50]],
        [[12, 56], [12, 68], [24, 68], [24, 56], [12, 56]],
        [[-120, 30], [-120, 48], [-80, 48], [-80, 30], [-120, 30]],
        [[20, 60], [20, 70], [30, 70], [30, 60], [20, 60]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[0]], "properties": {"name": "United Kingdom"}},
                {"type": "Polygon", "arcs": [[1]], "properties": {"name": "Sweden"}},
                {"type": "Polygon", "arcs": [[2]], "properties": {"name": "United States of America"}},
                {"type": "Polygon", "arcs": [[3]], "properties": {"name": "Finland"}},
                {"type": null, "properties": {"name": "Antarctica"}}
            ]
        }
    }
}"#;

fn session() -> Session {
    let records = load_bands(BANDS_CSV.as_bytes()).expect("csv loads");
    let atlas = Atlas::from_topojson(WORLD).expect("topology decodes");
    Session::new(records, atlas)
}

#[test]
fn test_rows_without_formed_year_are_dropped() {
    let session = session();
    assert_eq!(session.records().len(), 10);
    assert!(session.records().iter().all(|r| r.name != "Nameless"));
}

#[test]
fn test_default_aggregate_counts_every_band() {
    let session = session();
    let aggregate = session.aggregate();

    assert_eq!(aggregate.filtered.len(), 10);
    assert_eq!(aggregate.count("United States of America"), 4);
    assert_eq!(aggregate.count("Sweden"), 3);
    assert_eq!(aggregate.count("Germany"), 1);
    assert_eq!(aggregate.max_count(), 4);

    // Counts sum to the number of filtered records
    let total: usize = aggregate.counts.values().sum();
    assert_eq!(total, aggregate.filtered.len());
}

#[test]
fn test_filters_combine() {
    let mut session = session();
    session.set_filter(FilterState {
        decade: DecadeFilter::Decade(1980),
        status: StatusFilter::Active,
        subgenre: SubgenreFilter::Named("Melodic death".to_string()),
    });

    let aggregate = session.aggregate();
    assert_eq!(aggregate.filtered.len(), 2);
    assert_eq!(aggregate.count("Sweden"), 2);
    assert_eq!(aggregate.count("Finland"), 0);

    let view = session.map_view();
    assert_eq!(view.badge.text, "Filters: 1980s · active · Melodic death");
    let finland = view.countries.iter().find(|c| c.name == "Finland").unwrap();
    assert!(finland.disabled);
}

#[test]
fn test_empty_filter_result_keeps_map_paintable() {
    let mut session = session();
    session.apply_change(FilterChange::Decade(DecadeFilter::Decade(1960)));

    let view = session.map_view();
    assert_eq!(view.matching_bands, 0);
    assert_eq!(view.max_count, 1);
    assert!(view.countries.iter().all(|c| c.disabled));
}

#[test]
fn test_antarctica_has_no_geometry_but_is_named() {
    let session = session();
    assert!(session.atlas().contains("Antarctica"));
    assert!(session.pulse_for("Antarctica").is_none());
}

#[test]
fn test_search_for_unknown_band() {
    let mut session = session();
    let result = session.search("nonexistentband123");

    assert_eq!(
        result.outcome,
        SearchOutcome::NoMatch {
            query: "nonexistentband123".to_string()
        }
    );
    assert!(result.modal.is_none());
    assert_eq!(
        result.toast.unwrap().html,
        "No band found for \"<strong>nonexistentband123</strong>\""
    );
}

#[test]
fn test_search_then_escape() {
    let mut session = session();
    let result = session.search("opeth");

    let modal = result.modal.unwrap();
    assert_eq!(modal.title, "Sweden - bands");
    assert_eq!(modal.focus.as_deref(), Some("Opeth"));
    assert_eq!(result.pulse.unwrap().country, "Sweden");

    assert_eq!(
        session.key_press(&KeyPress::new("Escape")),
        Some(KeyAction::CloseModal)
    );
    assert!(session.modal_view().is_none());
}

#[test]
fn test_drill_down_and_reset() {
    let mut session = session();
    session.apply_change(FilterChange::Status(StatusFilter::Inactive));

    let modal = session.open_country("United States of America").unwrap();
    let names: Vec<&str> = modal.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(names, vec!["Death", "Megadeth", "Slayer"]);
    assert_eq!(modal.rows[0].row.status, "Inactive (2001)");

    let sync = session.reset();
    assert!(session.filter().is_default());
    assert_eq!(sync.search, "");
    assert_eq!(session.aggregate().filtered.len(), 10);
    assert!(!session.map_view().badge.visible);
}

#[test]
fn test_unmapped_origins_reported() {
    let session = session();
    let unresolved = session.unresolved_origins();

    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].name, "Germany");
}
