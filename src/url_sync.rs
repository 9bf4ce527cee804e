//! Bidirectional mapping between browse state and the address bar.
//!
//! The URL is the single source of truth every view re-renders from: the
//! selected category is the path segment (`/category/{id}`), the deeper
//! levels and all facets are query parameters. Serialization is
//! deterministic and lossless for states whose ids resolve in the tree;
//! stale ids degrade to root instead of failing.

use std::fmt;

use url::form_urlencoded;

use crate::filters::{keys, FacetValue, FilterSet};
use crate::selection::SelectionPath;
use crate::tree::CategoryTree;

/// Query keys carrying the deeper selection levels
const PARAM_SUBCATEGORY: &str = "subcategory";
const PARAM_CHILD_CATEGORY: &str = "childcategory";

/// A browse URL split into its path segment and query string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseUrl {
    pub path: String,
    pub query: String,
}

impl BrowseUrl {
    /// Split a full URL ("/category/1?min_price=500") into its two parts
    pub fn parse(full: &str) -> Self {
        match full.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: query.to_string(),
            },
            None => Self {
                path: full.to_string(),
                query: String::new(),
            },
        }
    }
}

impl fmt::Display for BrowseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        if self.query.is_empty() {
            write!(f, "{}", path)
        } else {
            write!(f, "{}?{}", path, self.query)
        }
    }
}

/// Extract the category id from a `/category/{id}` path segment.
/// Anything else (including a non-numeric id) yields None.
fn category_id_from_path(path: &str) -> Option<i64> {
    let trimmed = path.trim_matches('/');
    let rest = trimmed.strip_prefix("category/")?;
    rest.parse::<i64>().ok()
}

/// Parse a URL into the selection path and filter set.
///
/// The returned `SelectionPath` is validated against the tree: levels that
/// do not resolve are cleared (together with everything below them). The
/// raw ids still land in the `FilterSet`'s category keys so a downstream
/// listings call sees exactly what the link carried. Malformed values are
/// dropped silently; this function never fails.
pub fn from_url(path: &str, query: &str, tree: &CategoryTree) -> (SelectionPath, FilterSet) {
    let mut filters = FilterSet::new();
    let mut raw_category = category_id_from_path(path);
    let mut raw_subcategory: Option<i64> = None;
    let mut raw_child: Option<i64> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PARAM_SUBCATEGORY => match value.parse::<i64>() {
                Ok(id) => raw_subcategory = Some(id),
                Err(_) => log::debug!("dropping non-numeric subcategory '{}'", value),
            },
            PARAM_CHILD_CATEGORY => match value.parse::<i64>() {
                Ok(id) => raw_child = Some(id),
                Err(_) => log::debug!("dropping non-numeric childcategory '{}'", value),
            },
            // Legacy flat links carry the ids as plain facet keys; honor
            // them only where the canonical form left a gap
            keys::CATEGORY_ID => {
                if raw_category.is_none() {
                    raw_category = value.parse::<i64>().ok();
                }
            }
            keys::SUB_CATEGORY_ID => {
                if raw_subcategory.is_none() {
                    raw_subcategory = value.parse::<i64>().ok();
                }
            }
            keys::CHILD_CATEGORY_ID => {
                if raw_child.is_none() {
                    raw_child = value.parse::<i64>().ok();
                }
            }
            key => match FacetValue::parse_for_key(key, &value) {
                Some(parsed) => {
                    filters.insert(key, parsed);
                }
                None => log::debug!("dropping malformed facet '{}={}'", key, value),
            },
        }
    }

    // Structural cascade on the raw ids: a deeper level without its parent
    // is dangling and gets dropped before anything else sees it
    let raw = SelectionPath {
        category_id: raw_category,
        subcategory_id: raw_subcategory.filter(|_| raw_category.is_some()),
        child_category_id: raw_child
            .filter(|_| raw_category.is_some() && raw_subcategory.is_some()),
    };

    // Mirror the raw ids into the filter set (stale ids included, for the
    // listings backend), then validate the selection against the tree
    let mirror = [
        (keys::CATEGORY_ID, raw.category_id),
        (keys::SUB_CATEGORY_ID, raw.subcategory_id),
        (keys::CHILD_CATEGORY_ID, raw.child_category_id),
    ];
    for (key, id) in mirror {
        match id {
            Some(id) => {
                filters.insert(key, FacetValue::Int(id));
            }
            None => {
                filters.remove(key);
            }
        }
    }

    // Keep sort and its legacy alias agreeing, preferring the current key
    if let Some(sort) = filters.get(keys::SORT).cloned() {
        filters.insert(keys::SORT_BY, sort);
    } else if let Some(sort_by) = filters.get(keys::SORT_BY).cloned() {
        filters.insert(keys::SORT, sort_by);
    }

    let resolved = tree.resolve_path(&raw);
    if resolved != raw {
        log::debug!(
            "URL selection {:?} degraded to {:?} (unresolvable ids)",
            raw,
            resolved
        );
    }

    (resolved, filters)
}

/// Serialize browse state into a URL.
///
/// The category id becomes the path segment (absent at root); the deeper
/// levels and every other facet become query parameters. Unset keys are
/// omitted entirely, never serialized as empty strings. The category
/// mirror keys are represented by the path and level parameters, not
/// repeated as facets.
pub fn to_url(path: &SelectionPath, filters: &FilterSet) -> BrowseUrl {
    let path_segment = match path.category_id {
        Some(id) => format!("/category/{}", id),
        None => String::new(),
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(id) = path.subcategory_id {
        serializer.append_pair(PARAM_SUBCATEGORY, &id.to_string());
    }
    if let Some(id) = path.child_category_id {
        serializer.append_pair(PARAM_CHILD_CATEGORY, &id.to_string());
    }
    for (key, value) in filters.iter() {
        if matches!(
            key,
            keys::CATEGORY_ID | keys::SUB_CATEGORY_ID | keys::CHILD_CATEGORY_ID
        ) {
            continue;
        }
        serializer.append_pair(key, &value.to_string());
    }

    BrowseUrl {
        path: path_segment,
        query: serializer.finish(),
    }
}

/// The FilterSet snapshot serialized as the query string handed to the
/// listings-fetch collaborator. All keys are included, the category mirror
/// keys too: this is the backend contract, not the address bar.
pub fn listing_query(filters: &FilterSet) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in filters.iter() {
        serializer.append_pair(key, &value.to_string());
    }
    serializer.finish()
}
