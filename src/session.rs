//! The per-session browse store.
//!
//! `BrowseSession` owns the category tree, the selection controller, the
//! filter composer and the current URL snapshot. Views send it
//! `BrowseEvent`s and re-render from its snapshots; they never hold mutable
//! state of their own. Each event runs controller → composer → URL sync in
//! one synchronous turn, so no intermediate state is ever observable where
//! the three disagree.

use std::sync::Arc;

use crate::filters::{FacetValue, FilterComposer, FilterSet};
use crate::selection::{SelectionController, SelectionPath};
use crate::tree::CategoryTree;
use crate::url_sync::{self, BrowseUrl};

/// Every user interaction any view can produce
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseEvent {
    SelectCategory(i64),
    SelectSubcategory(i64),
    SelectChildCategory(i64),
    ResetSelection,
    SetFacet { key: String, value: Option<FacetValue> },
    ToggleFacet { key: String, value: FacetValue },
    PriceRange { min: Option<i64>, max: Option<i64> },
    /// Browser navigation (back/forward, pasted link): re-derive all state
    /// from the URL
    Navigate(String),
    /// Full reset: clears filters and selection together
    ClearFilters,
}

pub struct BrowseSession {
    tree: Arc<CategoryTree>,
    controller: SelectionController,
    composer: FilterComposer,
    url: BrowseUrl,
    revision: u64,
}

impl BrowseSession {
    pub fn new(tree: Arc<CategoryTree>) -> Self {
        let controller = SelectionController::new(Arc::clone(&tree));
        let composer = FilterComposer::new();
        let url = url_sync::to_url(&controller.current(), composer.filters());
        Self {
            tree,
            controller,
            composer,
            url,
            revision: 0,
        }
    }

    /// Restore a session from the address bar at application start
    pub fn from_url(tree: Arc<CategoryTree>, full_url: &str) -> Self {
        let parsed = BrowseUrl::parse(full_url);
        let (path, filters) = url_sync::from_url(&parsed.path, &parsed.query, &tree);
        let controller = SelectionController::with_path(Arc::clone(&tree), path);
        let composer = FilterComposer::with_filters(filters);
        let url = url_sync::to_url(&controller.current(), composer.filters());
        log::info!("session restored from URL '{}' -> '{}'", full_url, url);
        Self {
            tree,
            controller,
            composer,
            url,
            revision: 0,
        }
    }

    /// Handle one interaction. Returns whether observable state changed;
    /// when it did, the URL snapshot is already up to date on return.
    pub fn apply(&mut self, event: BrowseEvent) -> bool {
        log::debug!("session event: {:?}", event);

        let changed = match event {
            BrowseEvent::SelectCategory(id) => {
                let changed = self.controller.select_category(id);
                if changed {
                    self.composer.merge_selection_path(&self.controller.current());
                }
                changed
            }
            BrowseEvent::SelectSubcategory(id) => {
                let changed = self.controller.select_subcategory(id);
                if changed {
                    self.composer.merge_selection_path(&self.controller.current());
                }
                changed
            }
            BrowseEvent::SelectChildCategory(id) => {
                let changed = self.controller.select_child_category(id);
                if changed {
                    self.composer.merge_selection_path(&self.controller.current());
                }
                changed
            }
            BrowseEvent::ResetSelection => {
                let changed = self.controller.reset();
                if changed {
                    self.composer.merge_selection_path(&self.controller.current());
                }
                changed
            }
            BrowseEvent::SetFacet { key, value } => self.composer.set_facet(&key, value),
            BrowseEvent::ToggleFacet { key, value } => self.composer.toggle_facet(&key, value),
            BrowseEvent::PriceRange { min, max } => self.composer.apply_price_range(min, max),
            BrowseEvent::Navigate(full_url) => {
                let before = (self.controller.current(), self.composer.filters().clone());
                let parsed = BrowseUrl::parse(&full_url);
                let (path, filters) = url_sync::from_url(&parsed.path, &parsed.query, &self.tree);
                self.controller = SelectionController::with_path(Arc::clone(&self.tree), path);
                self.composer = FilterComposer::with_filters(filters);
                (self.controller.current(), self.composer.filters().clone()) != before
            }
            BrowseEvent::ClearFilters => {
                let selection_cleared = self.controller.reset();
                let filters_cleared = self.composer.reset();
                selection_cleared || filters_cleared
            }
        };

        if changed {
            // Same synchronous turn: the address bar is never stale
            // relative to in-memory state
            self.url = url_sync::to_url(&self.controller.current(), self.composer.filters());
            self.revision += 1;
            log::debug!("session now at rev {} url '{}'", self.revision, self.url);
        }

        changed
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn shared_tree(&self) -> Arc<CategoryTree> {
        Arc::clone(&self.tree)
    }

    /// The authoritative selection, stale ids included
    pub fn selection(&self) -> SelectionPath {
        self.controller.current()
    }

    /// The selection clamped to ids the tree resolves; what views highlight
    pub fn resolved_selection(&self) -> SelectionPath {
        self.controller.resolved()
    }

    pub fn filters(&self) -> &FilterSet {
        self.composer.filters()
    }

    pub fn active_filter_count(&self) -> usize {
        self.composer.active_count()
    }

    /// The current canonical URL snapshot all views derive state from
    pub fn url(&self) -> &BrowseUrl {
        &self.url
    }

    /// The query string handed to the listings-fetch collaborator
    pub fn listing_query(&self) -> String {
        url_sync::listing_query(self.composer.filters())
    }

    /// Bumped on every observable change; cheap staleness check for views
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
