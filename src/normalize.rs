//! Country-name normalization between the order dataset and the boundary geometry.
//!
//! The two sources spell a handful of countries differently; the table below maps
//! dataset names onto the names used by the boundary features so they can be joined.

use std::collections::BTreeSet;

/// dataset name -> geography name
const COUNTRY_ALIASES: [(&str, &str); 6] = [
    ("Guinea-Bissau", "Guinea Bissau"),
    ("Serbia", "Republic of Serbia"),
    ("Tanzania", "United Republic of Tanzania"),
    ("United States", "USA"),
    ("United Kingdom", "England"),
    ("Myanmar (Burma)", "Myanmar"),
];

/// Map a dataset country name to its boundary-data name. Unknown names pass through.
pub fn normalize_country_name(name: &str) -> String {
    COUNTRY_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| name.to_string())
}

/// The set of country keys present in the boundary geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoKeys {
    keys: BTreeSet<String>,
}

impl GeoKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Split `countries` into (joinable, unmatched). Unmatched keys are simply not drawn.
    pub fn partition<'a, I>(&self, countries: I) -> (Vec<&'a str>, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (hit, miss): (Vec<&str>, Vec<&str>) =
            countries.into_iter().partition(|c| self.contains(c));
        if !miss.is_empty() {
            log::debug!("{} country key(s) have no boundary feature: {:?}", miss.len(), miss);
        }
        (hit, miss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_applied_once() {
        assert_eq!(normalize_country_name("Myanmar (Burma)"), "Myanmar");
        // Output names are not themselves aliased.
        assert_eq!(normalize_country_name("USA"), "USA");
    }

    #[test]
    fn partition_splits_known_and_unknown() {
        let geo = GeoKeys::new(["USA", "France"]);
        let (hit, miss) = geo.partition(["USA", "Atlantis", "France"]);
        assert_eq!(hit, vec!["USA", "France"]);
        assert_eq!(miss, vec!["Atlantis"]);
    }
}
