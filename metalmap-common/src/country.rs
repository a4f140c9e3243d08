//! Country name resolution
//!
//! Maps free-text band origins ("Korea, South", "USA", "Sweden") onto the
//! canonical feature names used by the world atlas.
//!
//! Resolution is best-effort. A name that is not in the alias table is
//! returned unchanged; if it does not match any atlas feature the band simply
//! never shows up in a country count. Use
//! [`Session::unresolved_origins`](crate::session::Session::unresolved_origins)
//! to list those names.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Known historical/abbreviated origin names and their atlas spelling.
///
/// Identity entries (`Russia`, `South Korea`, `North Korea`) are kept so the
/// table lists every name the data set is known to use.
static COUNTRY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USA", "United States of America"),
        ("U.S.A.", "United States of America"),
        ("UK", "United Kingdom"),
        ("Holland", "Netherlands"),
        ("The Netherlands", "Netherlands"),
        ("UAE", "United Arab Emirates"),
        ("Russia", "Russia"),
        ("Russian Federation", "Russia"),
        ("South Korea", "South Korea"),
        ("North Korea", "North Korea"),
        ("Korea, South", "South Korea"),
        ("Korea, North", "North Korea"),
        ("Korea", "South Korea"),
        ("Czech Republic", "Czechia"),
    ])
});

/// Reduce a raw origin field to a single country name
///
/// The source lists several origins as a comma separated string. Only the
/// first one is kept, except for the "Korea, South" / "Korea, North" style
/// where the direction is moved to the front.
///
/// # Examples
/// ```
/// use metalmap_common::country::normalize_origin_name;
///
/// assert_eq!(normalize_origin_name("Korea, South"), "South Korea");
/// assert_eq!(normalize_origin_name("Sweden, Finland"), "Sweden");
/// assert_eq!(normalize_origin_name(""), "");
/// ```
pub fn normalize_origin_name(origin: &str) -> String {
    let parts: Vec<&str> = origin
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() >= 2 {
        let direction = parts[1].to_lowercase();
        if direction == "south" || direction == "north" {
            return format!("{} {}", capitalize(&direction), parts[0]);
        }
    }

    parts.first().map(|p| p.to_string()).unwrap_or_default()
}

/// Map a normalized origin onto the atlas feature name
///
/// Exact, case-sensitive lookup in the alias table. Misses fall through as
/// the trimmed input.
pub fn origin_to_world_name(origin: &str) -> String {
    let base = origin.trim();
    COUNTRY_ALIASES
        .get(base)
        .map(|name| name.to_string())
        .unwrap_or_else(|| base.to_string())
}

/// Full resolution: normalize, then apply aliases
pub fn resolve_country(origin: &str) -> String {
    origin_to_world_name(&normalize_origin_name(origin))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_moved_to_front() {
        assert_eq!(resolve_country("Korea, South"), "South Korea");
        assert_eq!(resolve_country("Korea, North"), "North Korea");
        assert_eq!(normalize_origin_name("Korea, SOUTH"), "South Korea");
    }

    #[test]
    fn test_aliases() {
        assert_eq!(resolve_country("USA"), "United States of America");
        assert_eq!(resolve_country("U.S.A."), "United States of America");
        assert_eq!(resolve_country("Holland"), "Netherlands");
        assert_eq!(resolve_country("Czech Republic"), "Czechia");
        assert_eq!(resolve_country("Russian Federation"), "Russia");
        assert_eq!(resolve_country("Korea"), "South Korea");
    }

    #[test]
    fn test_identity_aliases_are_preserved() {
        assert_eq!(origin_to_world_name("Russia"), "Russia");
        assert_eq!(origin_to_world_name("South Korea"), "South Korea");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(resolve_country("Wakanda"), "Wakanda");
        assert_eq!(resolve_country("  Sweden  "), "Sweden");
    }

    #[test]
    fn test_alias_lookup_is_case_sensitive() {
        assert_eq!(origin_to_world_name("usa"), "usa");
    }

    #[test]
    fn test_only_first_origin_is_kept() {
        assert_eq!(resolve_country("USA, Canada"), "United States of America");
        assert_eq!(normalize_origin_name(" , Norway"), "Norway");
    }

    #[test]
    fn test_empty_origin() {
        assert_eq!(normalize_origin_name(""), "");
        assert_eq!(resolve_country("   "), "");
    }
}
