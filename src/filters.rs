//! Ad-search filter state: the facet map and the composer that mutates it.
//!
//! A `FilterSet` is an open mapping from facet keys to primitive values.
//! An absent key means "not filtering on this facet"; empty strings and
//! zeroes are never used as sentinels. The `FilterComposer` is the only
//! mutation entry point and keeps the embedded category-path keys in sync
//! with the selection state machine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selection::SelectionPath;

/// Facet key constants shared by the composer, the URL codec and the views
pub mod keys {
    pub const SEARCH: &str = "search";
    pub const CATEGORY_ID: &str = "category_id";
    pub const SUB_CATEGORY_ID: &str = "sub_category_id";
    pub const CHILD_CATEGORY_ID: &str = "child_category_id";
    pub const BRAND_ID: &str = "brand_id";
    pub const STATE_ID: &str = "state_id";
    pub const CITY_ID: &str = "city_id";
    pub const MIN_PRICE: &str = "min_price";
    pub const MAX_PRICE: &str = "max_price";
    pub const CONDITION: &str = "condition";
    pub const LISTING_TYPE: &str = "listing_type";
    pub const SORT: &str = "sort";
    pub const SORT_BY: &str = "sort_by";
    pub const FEATURED: &str = "featured";
    pub const RADIUS: &str = "radius";
    pub const PAGE: &str = "page";
    pub const PER_PAGE: &str = "per_page";
}

/// Keys holding integer values (ids, prices, pagination, radius)
const INT_KEYS: &[&str] = &[
    keys::CATEGORY_ID,
    keys::SUB_CATEGORY_ID,
    keys::CHILD_CATEGORY_ID,
    keys::BRAND_ID,
    keys::STATE_ID,
    keys::CITY_ID,
    keys::MIN_PRICE,
    keys::MAX_PRICE,
    keys::RADIUS,
    keys::PAGE,
    keys::PER_PAGE,
];

/// Keys excluded from the active-filter badge count. Pagination is not a
/// filter, and `sort_by` is the legacy alias of `sort` (§ URL surface), so
/// counting it would double-count one choice.
const UNCOUNTED_KEYS: &[&str] = &[keys::PAGE, keys::PER_PAGE, keys::SORT_BY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    New,
    LikeNew,
    Used,
    ForParts,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Used,
        Condition::ForParts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like_new",
            Condition::Used => "used",
            Condition::ForParts => "for_parts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingType {
    Sale,
    Wanted,
    Trade,
    Free,
}

impl ListingType {
    pub const ALL: [ListingType; 4] = [
        ListingType::Sale,
        ListingType::Wanted,
        ListingType::Trade,
        ListingType::Free,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Wanted => "wanted",
            ListingType::Trade => "trade",
            ListingType::Free => "free",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Relevance,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::Relevance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Relevance => "relevance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// A primitive facet value. No coercion between facets: ids and prices are
/// integers, `condition`/`listing_type`/`sort` hold one of their enumerated
/// strings, `featured` is a flag, everything else is free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Int(i64),
    Flag(bool),
    Text(String),
}

impl FacetValue {
    pub fn text(s: impl Into<String>) -> Self {
        FacetValue::Text(s.into())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FacetValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FacetValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw (URL) string into the value type the key demands.
    /// Returns None for malformed values, which the caller drops silently.
    pub fn parse_for_key(key: &str, raw: &str) -> Option<FacetValue> {
        if INT_KEYS.contains(&key) {
            return raw.parse::<i64>().ok().map(FacetValue::Int);
        }
        match key {
            keys::CONDITION => Condition::parse(raw).map(|c| FacetValue::text(c.as_str())),
            keys::LISTING_TYPE => ListingType::parse(raw).map(|t| FacetValue::text(t.as_str())),
            keys::SORT | keys::SORT_BY => SortKey::parse(raw).map(|k| FacetValue::text(k.as_str())),
            keys::FEATURED => match raw {
                "true" | "1" => Some(FacetValue::Flag(true)),
                "false" | "0" => Some(FacetValue::Flag(false)),
                _ => None,
            },
            // Free text and forward-compatible unknown keys pass through
            _ => {
                if raw.is_empty() {
                    None
                } else {
                    Some(FacetValue::text(raw))
                }
            }
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Int(i) => write!(f, "{}", i),
            FacetValue::Flag(b) => write!(f, "{}", b),
            FacetValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The facet map. Ordered so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: BTreeMap<String, FacetValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FacetValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: FacetValue) -> bool {
        let key = key.into();
        self.entries.insert(key, value.clone()) != Some(value)
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The single mutation entry point for the facet map.
///
/// Couples the filter state to the selection state machine in exactly one
/// place: `merge_selection_path`, which the session runs synchronously after
/// every selection mutation and before the URL update.
#[derive(Debug, Clone, Default)]
pub struct FilterComposer {
    filters: FilterSet,
}

impl FilterComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: FilterSet) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Set or remove one facet. `None` removes the key entirely.
    ///
    /// `sort` and the legacy `sort_by` are kept in sync: writing or removing
    /// either touches both, so old links and new links agree.
    pub fn set_facet(&mut self, key: &str, value: Option<FacetValue>) -> bool {
        if key == keys::SORT || key == keys::SORT_BY {
            let a = self.set_one(keys::SORT, value.clone());
            let b = self.set_one(keys::SORT_BY, value);
            return a || b;
        }
        self.set_one(key, value)
    }

    fn set_one(&mut self, key: &str, value: Option<FacetValue>) -> bool {
        let changed = match value {
            Some(value) => self.filters.insert(key, value),
            None => self.filters.remove(key),
        };
        if changed {
            log::debug!("facet '{}' updated", key);
        }
        changed
    }

    /// Toggle semantics for single-choice quick filters: a second click on
    /// the same option clears the facet instead of leaving it stuck.
    pub fn toggle_facet(&mut self, key: &str, value: FacetValue) -> bool {
        if self.filters.get(key) == Some(&value) {
            self.set_facet(key, None)
        } else {
            self.set_facet(key, Some(value))
        }
    }

    /// Set either end of the price range; `None` leaves that end open.
    /// `min > max` is a caller error and is stored as given, not rejected.
    pub fn apply_price_range(&mut self, min: Option<i64>, max: Option<i64>) -> bool {
        let a = self.set_one(keys::MIN_PRICE, min.map(FacetValue::Int));
        let b = self.set_one(keys::MAX_PRICE, max.map(FacetValue::Int));
        a || b
    }

    /// Mirror a selection snapshot into the category-path keys, removing
    /// keys whose counterpart became unset.
    pub fn merge_selection_path(&mut self, path: &SelectionPath) {
        let pairs = [
            (keys::CATEGORY_ID, path.category_id),
            (keys::SUB_CATEGORY_ID, path.subcategory_id),
            (keys::CHILD_CATEGORY_ID, path.child_category_id),
        ];
        for (key, id) in pairs {
            self.set_one(key, id.map(FacetValue::Int));
        }
    }

    /// Number of active filters for badge display. Pagination keys and the
    /// `sort_by` alias are not counted.
    pub fn active_count(&self) -> usize {
        self.filters
            .iter()
            .filter(|(key, _)| !UNCOUNTED_KEYS.contains(key))
            .count()
    }

    /// Clear every facet. The caller is responsible for resetting the
    /// selection controller in the same turn so the two stay consistent.
    pub fn reset(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        log::debug!("filters cleared ({} facets)", self.filters.len());
        self.filters.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_facet_and_removal() {
        let mut composer = FilterComposer::new();

        assert!(composer.set_facet(keys::MIN_PRICE, Some(FacetValue::Int(500))));
        assert_eq!(
            composer.filters().get(keys::MIN_PRICE),
            Some(&FacetValue::Int(500))
        );

        // Overwriting with the same value is not a change
        assert!(!composer.set_facet(keys::MIN_PRICE, Some(FacetValue::Int(500))));

        assert!(composer.set_facet(keys::MIN_PRICE, None));
        assert!(!composer.filters().contains(keys::MIN_PRICE));
        // Removing an absent key is not a change
        assert!(!composer.set_facet(keys::MIN_PRICE, None));
    }

    #[test]
    fn test_toggle_symmetry() {
        let mut composer = FilterComposer::new();
        let before = composer.filters().clone();

        composer.toggle_facet(keys::CONDITION, FacetValue::text("new"));
        assert_eq!(
            composer.filters().get(keys::CONDITION),
            Some(&FacetValue::text("new"))
        );

        composer.toggle_facet(keys::CONDITION, FacetValue::text("new"));
        assert_eq!(composer.filters(), &before);
    }

    #[test]
    fn test_toggle_replaces_different_value() {
        let mut composer = FilterComposer::new();
        composer.toggle_facet(keys::LISTING_TYPE, FacetValue::text("sale"));
        composer.toggle_facet(keys::LISTING_TYPE, FacetValue::text("trade"));
        assert_eq!(
            composer.filters().get(keys::LISTING_TYPE),
            Some(&FacetValue::text("trade"))
        );
    }

    #[test]
    fn test_price_range_open_ends() {
        let mut composer = FilterComposer::new();

        composer.apply_price_range(Some(100), None);
        assert_eq!(composer.filters().get(keys::MIN_PRICE), Some(&FacetValue::Int(100)));
        assert!(!composer.filters().contains(keys::MAX_PRICE));

        composer.apply_price_range(None, Some(900));
        assert!(!composer.filters().contains(keys::MIN_PRICE));
        assert_eq!(composer.filters().get(keys::MAX_PRICE), Some(&FacetValue::Int(900)));

        // Crossed range is the caller's problem, not rejected here
        composer.apply_price_range(Some(500), Some(100));
        assert_eq!(composer.filters().get(keys::MIN_PRICE), Some(&FacetValue::Int(500)));
        assert_eq!(composer.filters().get(keys::MAX_PRICE), Some(&FacetValue::Int(100)));
    }

    #[test]
    fn test_merge_selection_path() {
        let mut composer = FilterComposer::new();
        composer.merge_selection_path(&SelectionPath::child(1, 10, 100));
        assert_eq!(composer.filters().get(keys::CATEGORY_ID), Some(&FacetValue::Int(1)));
        assert_eq!(composer.filters().get(keys::SUB_CATEGORY_ID), Some(&FacetValue::Int(10)));
        assert_eq!(composer.filters().get(keys::CHILD_CATEGORY_ID), Some(&FacetValue::Int(100)));

        // Unset levels remove their keys
        composer.merge_selection_path(&SelectionPath::category(2));
        assert_eq!(composer.filters().get(keys::CATEGORY_ID), Some(&FacetValue::Int(2)));
        assert!(!composer.filters().contains(keys::SUB_CATEGORY_ID));
        assert!(!composer.filters().contains(keys::CHILD_CATEGORY_ID));
    }

    #[test]
    fn test_active_count_monotonicity() {
        let mut composer = FilterComposer::new();
        assert_eq!(composer.active_count(), 0);

        composer.set_facet(keys::SEARCH, Some(FacetValue::text("boat")));
        assert_eq!(composer.active_count(), 1);

        // Overwrite with a different value: unchanged count
        composer.set_facet(keys::SEARCH, Some(FacetValue::text("kayak")));
        assert_eq!(composer.active_count(), 1);

        composer.set_facet(keys::MIN_PRICE, Some(FacetValue::Int(50)));
        assert_eq!(composer.active_count(), 2);

        composer.set_facet(keys::SEARCH, None);
        assert_eq!(composer.active_count(), 1);
    }

    #[test]
    fn test_active_count_ignores_pagination_and_sort_alias() {
        let mut composer = FilterComposer::new();
        composer.set_facet(keys::PAGE, Some(FacetValue::Int(3)));
        composer.set_facet(keys::PER_PAGE, Some(FacetValue::Int(48)));
        assert_eq!(composer.active_count(), 0);

        // One sort choice writes both keys but counts once
        composer.set_facet(keys::SORT, Some(FacetValue::text("price_asc")));
        assert_eq!(composer.active_count(), 1);
    }

    #[test]
    fn test_sort_alias_stays_in_sync() {
        let mut composer = FilterComposer::new();

        composer.set_facet(keys::SORT, Some(FacetValue::text("newest")));
        assert_eq!(composer.filters().get(keys::SORT), Some(&FacetValue::text("newest")));
        assert_eq!(composer.filters().get(keys::SORT_BY), Some(&FacetValue::text("newest")));

        // Writing through the legacy key updates both too
        composer.set_facet(keys::SORT_BY, Some(FacetValue::text("oldest")));
        assert_eq!(composer.filters().get(keys::SORT), Some(&FacetValue::text("oldest")));

        composer.set_facet(keys::SORT, None);
        assert!(!composer.filters().contains(keys::SORT));
        assert!(!composer.filters().contains(keys::SORT_BY));
    }

    #[test]
    fn test_reset() {
        let mut composer = FilterComposer::new();
        assert!(!composer.reset());

        composer.set_facet(keys::SEARCH, Some(FacetValue::text("boat")));
        composer.merge_selection_path(&SelectionPath::category(1));
        assert!(composer.reset());
        assert!(composer.filters().is_empty());
    }

    #[test]
    fn test_parse_for_key() {
        assert_eq!(
            FacetValue::parse_for_key(keys::MIN_PRICE, "500"),
            Some(FacetValue::Int(500))
        );
        assert_eq!(FacetValue::parse_for_key(keys::MIN_PRICE, "cheap"), None);

        assert_eq!(
            FacetValue::parse_for_key(keys::CONDITION, "like_new"),
            Some(FacetValue::text("like_new"))
        );
        assert_eq!(FacetValue::parse_for_key(keys::CONDITION, "mint"), None);

        assert_eq!(
            FacetValue::parse_for_key(keys::SORT, "price_desc"),
            Some(FacetValue::text("price_desc"))
        );
        assert_eq!(FacetValue::parse_for_key(keys::SORT_BY, "sideways"), None);

        assert_eq!(
            FacetValue::parse_for_key(keys::FEATURED, "1"),
            Some(FacetValue::Flag(true))
        );
        assert_eq!(FacetValue::parse_for_key(keys::FEATURED, "maybe"), None);

        // Unknown keys are preserved verbatim as text
        assert_eq!(
            FacetValue::parse_for_key("warranty", "extended"),
            Some(FacetValue::text("extended"))
        );
        assert_eq!(FacetValue::parse_for_key("warranty", ""), None);
    }
}
