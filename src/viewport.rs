//! Per-view presentation state for the four category renderings.
//!
//! Each adapter owns only its own scroll/page/open state and produces plain
//! view models from session snapshots. None of them mutates core state:
//! selection changes go through `BrowseSession::apply`, and highlighting is
//! derived from the resolved selection, so a stale id is simply not
//! highlighted.

use crate::filters::{keys, Condition, FacetValue, ListingType, SortKey};
use crate::selection::SelectionPath;
use crate::session::BrowseSession;
use crate::tree::CategoryMatch;

/// One renderable category node, at any level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub is_selected: bool,
    pub has_children: bool,
}

fn level_one_items(session: &BrowseSession) -> Vec<CategoryItem> {
    let selected = session.resolved_selection().category_id;
    session
        .tree()
        .categories()
        .iter()
        .map(|c| CategoryItem {
            id: c.id,
            name: c.name.clone(),
            icon: c.icon.clone(),
            is_selected: selected == Some(c.id),
            has_children: !c.subcategories.is_empty(),
        })
        .collect()
}

/// Horizontally scrolling desktop category bar
#[derive(Debug, Clone)]
pub struct DesktopBarView {
    scroll_offset: usize,
    viewport_width: usize,
}

impl DesktopBarView {
    pub fn new(viewport_width: usize) -> Self {
        Self {
            scroll_offset: 0,
            viewport_width: viewport_width.max(1),
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// The slice of level-1 items currently inside the viewport
    pub fn visible_items(&self, session: &BrowseSession) -> Vec<CategoryItem> {
        level_one_items(session)
            .into_iter()
            .skip(self.scroll_offset)
            .take(self.viewport_width)
            .collect()
    }

    pub fn scroll_left(&mut self) -> bool {
        if self.scroll_offset == 0 {
            return false;
        }
        self.scroll_offset -= 1;
        true
    }

    pub fn scroll_right(&mut self, session: &BrowseSession) -> bool {
        let total = session.tree().len();
        if self.scroll_offset + self.viewport_width >= total {
            return false;
        }
        self.scroll_offset += 1;
        true
    }

    /// Bring the selected category inside the viewport, moving the window
    /// as little as possible
    pub fn ensure_selected_visible(&mut self, session: &BrowseSession) {
        let Some(selected) = session.resolved_selection().category_id else {
            return;
        };
        let Some(index) = session
            .tree()
            .categories()
            .iter()
            .position(|c| c.id == selected)
        else {
            return;
        };

        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + self.viewport_width {
            self.scroll_offset = index + 1 - self.viewport_width;
        }
    }
}

/// Mobile category bar: fixed-size pages navigated by swipe
#[derive(Debug, Clone)]
pub struct MobileBarView {
    page: usize,
    page_size: usize,
}

impl MobileBarView {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self, session: &BrowseSession) -> usize {
        session.tree().len().div_ceil(self.page_size)
    }

    /// Items on the current page; an out-of-range page renders empty
    pub fn visible_items(&self, session: &BrowseSession) -> Vec<CategoryItem> {
        level_one_items(session)
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// Swipe toward higher pages; clamped at the last page
    pub fn swipe_left(&mut self, session: &BrowseSession) -> bool {
        let count = self.page_count(session);
        if count == 0 || self.page + 1 >= count {
            return false;
        }
        self.page += 1;
        true
    }

    /// Swipe toward lower pages; clamped at the first page
    pub fn swipe_right(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Jump to the page containing the selected category
    pub fn jump_to_selected(&mut self, session: &BrowseSession) {
        let Some(selected) = session.resolved_selection().category_id else {
            return;
        };
        if let Some(index) = session
            .tree()
            .categories()
            .iter()
            .position(|c| c.id == selected)
        {
            self.page = index / self.page_size;
        }
    }
}

/// What the mega-menu renders: three drill-down columns, or ranked search
/// results while the quick-picker query is non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MegaMenuModel {
    Columns {
        categories: Vec<CategoryItem>,
        subcategories: Vec<CategoryItem>,
        children: Vec<CategoryItem>,
    },
    SearchResults(Vec<CategoryMatch>),
}

/// Mega-menu dialog: open/closed plus a fuzzy quick-picker query
#[derive(Debug, Clone, Default)]
pub struct MegaMenuView {
    open: bool,
    query: String,
}

impl MegaMenuView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing also drops the quick-picker query
    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn model(&self, session: &BrowseSession) -> MegaMenuModel {
        if !self.query.is_empty() {
            return MegaMenuModel::SearchResults(session.tree().search(&self.query));
        }

        let resolved = session.resolved_selection();
        let subcategories = match resolved.category_id {
            Some(category_id) => subcategory_items(session, &resolved, category_id),
            None => Vec::new(),
        };
        let children = match (resolved.category_id, resolved.subcategory_id) {
            (Some(category_id), Some(subcategory_id)) => {
                child_items(session, &resolved, category_id, subcategory_id)
            }
            _ => Vec::new(),
        };

        MegaMenuModel::Columns {
            categories: level_one_items(session),
            subcategories,
            children,
        }
    }
}

fn subcategory_items(
    session: &BrowseSession,
    resolved: &SelectionPath,
    category_id: i64,
) -> Vec<CategoryItem> {
    let Some(category) = session.tree().category(category_id) else {
        return Vec::new();
    };
    category
        .subcategories
        .iter()
        .map(|s| CategoryItem {
            id: s.id,
            name: s.name.clone(),
            icon: None,
            is_selected: resolved.subcategory_id == Some(s.id),
            has_children: s.has_children(),
        })
        .collect()
}

fn child_items(
    session: &BrowseSession,
    resolved: &SelectionPath,
    category_id: i64,
    subcategory_id: i64,
) -> Vec<CategoryItem> {
    let Some(sub) = session.tree().subcategory(category_id, subcategory_id) else {
        return Vec::new();
    };
    sub.children
        .iter()
        .map(|c| CategoryItem {
            id: c.id,
            name: c.name.clone(),
            icon: None,
            is_selected: resolved.child_category_id == Some(c.id),
            has_children: false,
        })
        .collect()
}

/// One quick-filter row in the sidebar panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRow {
    pub key: &'static str,
    pub value: String,
    pub is_active: bool,
}

/// Everything the sidebar filter panel renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarModel {
    pub condition_rows: Vec<FacetRow>,
    pub listing_type_rows: Vec<FacetRow>,
    pub sort_rows: Vec<FacetRow>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub active_count: usize,
}

/// Sidebar filter panel. Stateless apart from what the session already
/// holds, so the "adapter" is just the model builder.
#[derive(Debug, Clone, Default)]
pub struct SidebarView;

impl SidebarView {
    pub fn model(session: &BrowseSession) -> SidebarModel {
        let filters = session.filters();

        let facet_rows = |key: &'static str, values: &[&'static str]| -> Vec<FacetRow> {
            let current = filters.get(key);
            values
                .iter()
                .map(|value| FacetRow {
                    key,
                    value: (*value).to_string(),
                    is_active: current == Some(&FacetValue::text(*value)),
                })
                .collect()
        };

        SidebarModel {
            condition_rows: facet_rows(
                keys::CONDITION,
                &Condition::ALL.map(|c| c.as_str()),
            ),
            listing_type_rows: facet_rows(
                keys::LISTING_TYPE,
                &ListingType::ALL.map(|t| t.as_str()),
            ),
            sort_rows: facet_rows(keys::SORT, &SortKey::ALL.map(|k| k.as_str())),
            price_min: filters.get(keys::MIN_PRICE).and_then(FacetValue::as_int),
            price_max: filters.get(keys::MAX_PRICE).and_then(FacetValue::as_int),
            active_count: session.active_filter_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::BrowseEvent;
    use crate::tree::{Category, CategoryTree, SubCategory};
    use std::sync::Arc;

    fn session_with(categories: usize) -> BrowseSession {
        let tree: Vec<Category> = (1..=categories as i64)
            .map(|id| {
                let mut c = Category::new(id, format!("Category {}", id));
                if id == 1 {
                    let mut sub = SubCategory::new(10, "Cars", 1);
                    sub.add_child(SubCategory::new(100, "Sedans", 1));
                    c.add_subcategory(sub);
                }
                c
            })
            .collect();
        BrowseSession::new(Arc::new(CategoryTree::new(tree)))
    }

    #[test]
    fn test_desktop_bar_scrolling_and_highlight() {
        let mut session = session_with(12);
        session.apply(BrowseEvent::SelectCategory(9));

        let mut bar = DesktopBarView::new(5);
        let visible = bar.visible_items(&session);
        assert_eq!(visible.len(), 5);
        assert_eq!(visible[0].id, 1);
        assert!(!visible.iter().any(|i| i.is_selected));

        bar.ensure_selected_visible(&session);
        let visible = bar.visible_items(&session);
        assert!(visible.iter().any(|i| i.id == 9 && i.is_selected));

        // Clamped at both ends
        while bar.scroll_right(&session) {}
        assert_eq!(bar.scroll_offset(), 7);
        while bar.scroll_left() {}
        assert_eq!(bar.scroll_offset(), 0);
    }

    #[test]
    fn test_mobile_bar_paging() {
        let session = session_with(10);
        let mut bar = MobileBarView::new(4);

        assert_eq!(bar.page_count(&session), 3);
        assert_eq!(bar.visible_items(&session).len(), 4);

        assert!(bar.swipe_left(&session));
        assert!(bar.swipe_left(&session));
        assert!(!bar.swipe_left(&session)); // clamped at last page
        assert_eq!(bar.page(), 2);
        assert_eq!(bar.visible_items(&session).len(), 2);

        assert!(bar.swipe_right());
        assert_eq!(bar.page(), 1);
        bar.swipe_right();
        assert!(!bar.swipe_right()); // clamped at first page
    }

    #[test]
    fn test_mobile_bar_jump_to_selected() {
        let mut session = session_with(10);
        session.apply(BrowseEvent::SelectCategory(7));

        let mut bar = MobileBarView::new(3);
        bar.jump_to_selected(&session);
        assert_eq!(bar.page(), 2);
        assert!(bar
            .visible_items(&session)
            .iter()
            .any(|i| i.id == 7 && i.is_selected));
    }

    #[test]
    fn test_mega_menu_columns_follow_selection() {
        let mut session = session_with(3);
        let mut menu = MegaMenuView::new();
        menu.open();

        match menu.model(&session) {
            MegaMenuModel::Columns {
                categories,
                subcategories,
                children,
            } => {
                assert_eq!(categories.len(), 3);
                assert!(subcategories.is_empty());
                assert!(children.is_empty());
            }
            other => panic!("unexpected model: {:?}", other),
        }

        session.apply(BrowseEvent::SelectCategory(1));
        session.apply(BrowseEvent::SelectSubcategory(10));
        match menu.model(&session) {
            MegaMenuModel::Columns {
                subcategories,
                children,
                ..
            } => {
                assert_eq!(subcategories.len(), 1);
                assert!(subcategories[0].is_selected);
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].name, "Sedans");
            }
            other => panic!("unexpected model: {:?}", other),
        }
    }

    #[test]
    fn test_mega_menu_search_mode() {
        let session = session_with(3);
        let mut menu = MegaMenuView::new();
        menu.open();
        menu.set_query("sedan");

        match menu.model(&session) {
            MegaMenuModel::SearchResults(results) => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].name, "Sedans");
            }
            other => panic!("unexpected model: {:?}", other),
        }

        menu.close();
        assert!(menu.query().is_empty());
    }

    #[test]
    fn test_stale_selection_is_not_highlighted() {
        let mut session = session_with(2);
        // Stored optimistically, resolves to nothing
        session.apply(BrowseEvent::SelectCategory(999));

        let bar = DesktopBarView::new(5);
        assert!(!bar.visible_items(&session).iter().any(|i| i.is_selected));
    }

    #[test]
    fn test_sidebar_model_rows_and_badge() {
        let mut session = session_with(1);
        session.apply(BrowseEvent::ToggleFacet {
            key: keys::CONDITION.to_string(),
            value: FacetValue::text("used"),
        });
        session.apply(BrowseEvent::PriceRange {
            min: Some(100),
            max: None,
        });

        let model = SidebarView::model(&session);
        assert_eq!(model.condition_rows.len(), Condition::ALL.len());
        assert!(model
            .condition_rows
            .iter()
            .any(|r| r.value == "used" && r.is_active));
        assert!(model
            .condition_rows
            .iter()
            .filter(|r| r.value != "used")
            .all(|r| !r.is_active));
        assert_eq!(model.price_min, Some(100));
        assert_eq!(model.price_max, None);
        assert_eq!(model.active_count, 2);
    }
}
