use order_atlas::normalize::{GeoKeys, normalize_country_name};

#[test]
fn known_aliases_map_to_boundary_names() {
    assert_eq!(normalize_country_name("United States"), "USA");
    assert_eq!(normalize_country_name("United Kingdom"), "England");
    assert_eq!(normalize_country_name("Tanzania"), "United Republic of Tanzania");
    assert_eq!(normalize_country_name("Serbia"), "Republic of Serbia");
    assert_eq!(normalize_country_name("Guinea-Bissau"), "Guinea Bissau");
}

#[test]
fn unknown_names_pass_through_unchanged() {
    assert_eq!(normalize_country_name("France"), "France");
    assert_eq!(normalize_country_name(""), "");
    // lookups are exact, not case-folded
    assert_eq!(normalize_country_name("united states"), "united states");
}

#[test]
fn unmatched_keys_are_reported_not_dropped_silently() {
    let geo = GeoKeys::new(["USA", "France", "England"]);
    let (hit, miss) = geo.partition(["USA", "France", "Atlantis"]);
    assert_eq!(hit, vec!["USA", "France"]);
    assert_eq!(miss, vec!["Atlantis"]);
    assert_eq!(geo.len(), 3);
}
