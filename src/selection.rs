//! Category drill-down state machine.
//!
//! One `SelectionController` per browsing session owns the authoritative
//! `SelectionPath`; every view routes selection changes through it. The
//! cascade invariant (a deeper level is only set while its parent level is
//! set) is enforced on every transition, not just at construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tree::CategoryTree;

/// The current drill-down position: (category, subcategory, child category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectionPath {
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub child_category_id: Option<i64>,
}

/// The three reachable states of the drill-down machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Root,
    Category,
    Subcategory,
}

impl SelectionPath {
    pub fn category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn subcategory(category_id: i64, subcategory_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            subcategory_id: Some(subcategory_id),
            child_category_id: None,
        }
    }

    pub fn child(category_id: i64, subcategory_id: i64, child_category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            subcategory_id: Some(subcategory_id),
            child_category_id: Some(child_category_id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.category_id.is_none()
    }

    pub fn state(&self) -> SelectionState {
        if self.category_id.is_none() {
            SelectionState::Root
        } else if self.subcategory_id.is_none() {
            SelectionState::Category
        } else {
            SelectionState::Subcategory
        }
    }

    /// True when deeper levels are only set while their parent level is set.
    /// Every path this module hands out satisfies this.
    pub fn is_cascade_consistent(&self) -> bool {
        (self.subcategory_id.is_none() || self.category_id.is_some())
            && (self.child_category_id.is_none() || self.subcategory_id.is_some())
    }
}

/// Owns the session's `SelectionPath` and provides the only mutation entry
/// points. Each operation returns whether the path changed.
#[derive(Debug, Clone)]
pub struct SelectionController {
    tree: Arc<CategoryTree>,
    path: SelectionPath,
}

impl SelectionController {
    pub fn new(tree: Arc<CategoryTree>) -> Self {
        Self {
            tree,
            path: SelectionPath::default(),
        }
    }

    /// Start from a path already validated against the tree (URL restore)
    pub fn with_path(tree: Arc<CategoryTree>, path: SelectionPath) -> Self {
        let path = tree.resolve_path(&path);
        Self { tree, path }
    }

    /// Immutable snapshot of the current position
    pub fn current(&self) -> SelectionPath {
        self.path
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// Select a top-level category.
    ///
    /// Re-selecting the current category is a toggle-off: the whole path is
    /// cleared. Selecting a different one cascade-resets the deeper levels.
    /// An id the tree does not know is still stored, so a selection made
    /// while the tree is loading survives the race; it resolves to "no
    /// match" on lookup until the tree catches up. With an empty tree (the
    /// fetch failed outright) the operation is a no-op instead.
    pub fn select_category(&mut self, id: i64) -> bool {
        if self.tree.is_empty() {
            log::debug!("select_category({}) ignored: empty category tree", id);
            return false;
        }

        if self.path.category_id == Some(id) {
            log::debug!("select_category({}): toggle-off to root", id);
            self.path = SelectionPath::default();
        } else {
            log::debug!("select_category({})", id);
            self.path = SelectionPath::category(id);
        }
        true
    }

    /// Select a level-2 subcategory; no-op unless a category is selected
    pub fn select_subcategory(&mut self, id: i64) -> bool {
        if self.tree.is_empty() || self.path.category_id.is_none() {
            log::debug!("select_subcategory({}) ignored: no category selected", id);
            return false;
        }

        if self.path.subcategory_id == Some(id) {
            log::debug!("select_subcategory({}): toggle-off", id);
            self.path.subcategory_id = None;
            self.path.child_category_id = None;
        } else {
            log::debug!("select_subcategory({})", id);
            self.path.subcategory_id = Some(id);
            self.path.child_category_id = None;
        }
        true
    }

    /// Select a level-3 child category; no-op unless a subcategory is selected
    pub fn select_child_category(&mut self, id: i64) -> bool {
        if self.tree.is_empty() || self.path.subcategory_id.is_none() {
            log::debug!("select_child_category({}) ignored: no subcategory selected", id);
            return false;
        }

        if self.path.child_category_id == Some(id) {
            log::debug!("select_child_category({}): toggle-off", id);
            self.path.child_category_id = None;
        } else {
            log::debug!("select_child_category({})", id);
            self.path.child_category_id = Some(id);
        }
        true
    }

    /// Clear the whole path back to root
    pub fn reset(&mut self) -> bool {
        if self.path == SelectionPath::default() {
            return false;
        }
        log::debug!("selection reset to root");
        self.path = SelectionPath::default();
        true
    }

    /// The current path clamped to ids that resolve in the tree; what views
    /// use for highlighting. Stale ids stay in `current()` untouched.
    pub fn resolved(&self) -> SelectionPath {
        self.tree.resolve_path(&self.path)
    }
}
