use serde::{Deserialize, Serialize};

use crate::filters::FilterSet;
use crate::selection::SelectionPath;
use crate::session::BrowseSession;

/// A serializable snapshot of everything a view (or a script assertion)
/// can observe about a session. This is the CLI's JSON output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub selection: SelectionPath,
    /// Selection clamped to ids the tree resolves (what gets highlighted)
    pub resolved_selection: SelectionPath,
    pub filters: FilterSet,
    pub url: String,
    pub listing_query: String,
    pub active_filters: usize,
}

impl SessionSnapshot {
    pub fn from_session(session: &BrowseSession) -> Self {
        Self {
            selection: session.selection(),
            resolved_selection: session.resolved_selection(),
            filters: session.filters().clone(),
            url: session.url().to_string(),
            listing_query: session.listing_query(),
            active_filters: session.active_filter_count(),
        }
    }

    /// Render the selection as `cat,sub,child` with `-` for unset levels,
    /// the format script `assert:path:` lines use
    pub fn path_display(&self) -> String {
        let level = |id: Option<i64>| id.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        format!(
            "{},{},{}",
            level(self.selection.category_id),
            level(self.selection.subcategory_id),
            level(self.selection.child_category_id)
        )
    }
}
