use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use crate::selection::SelectionPath;

/// The category hierarchy is capped at three levels: category, subcategory,
/// child category. Nodes below the cap are pruned at construction time so the
/// rest of the engine never has to re-check the rule.
pub const MAX_DEPTH: usize = 3;

/// A level-2 or level-3 node. The same shape is used for both levels;
/// level-3 nodes simply have no surviving children after pruning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub children: Vec<SubCategory>,
}

impl SubCategory {
    pub fn new(id: i64, name: impl Into<String>, category_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            category_id,
            children: Vec::new(),
        }
    }

    /// Add a level-3 child node
    pub fn add_child(&mut self, child: SubCategory) {
        self.children.push(child);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A top-level (level-1) category as returned by the category-fetch API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<SubCategory>,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            subcategories: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn add_subcategory(&mut self, sub: SubCategory) {
        self.subcategories.push(sub);
    }
}

/// A fuzzy-search hit inside the tree, carrying the full drill-down path so
/// a picker can select the node directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub path: SelectionPath,
    pub name: String,
    pub score: i64,
}

/// Immutable in-memory category hierarchy.
///
/// Built once per browsing session from the category-fetch collaborator and
/// shared read-only by every view. A failed fetch is represented by an empty
/// tree, never by an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    categories: Vec<Category>,
}

impl CategoryTree {
    /// Build a tree, pruning any nodes below the depth cap
    pub fn new(mut categories: Vec<Category>) -> Self {
        for category in &mut categories {
            for sub in &mut category.subcategories {
                for child in &mut sub.children {
                    // Level-4 nodes are ignored by the whole engine
                    child.children.clear();
                }
            }
        }
        Self { categories }
    }

    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Parse the JSON shape produced by the category-fetch API
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        log::info!("Category tree parsed: {} top-level categories", categories.len());
        Ok(Self::new(categories))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Look up a level-1 category by id
    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a level-2 subcategory under the given category
    pub fn subcategory(&self, category_id: i64, id: i64) -> Option<&SubCategory> {
        self.category(category_id)?
            .subcategories
            .iter()
            .find(|s| s.id == id)
    }

    /// Look up a level-3 child under the given category/subcategory
    pub fn child_category(
        &self,
        category_id: i64,
        subcategory_id: i64,
        id: i64,
    ) -> Option<&SubCategory> {
        self.subcategory(category_id, subcategory_id)?
            .children
            .iter()
            .find(|c| c.id == id)
    }

    /// Clamp a raw selection path to the ids that actually resolve in this
    /// tree. Each unresolvable level is cleared together with everything
    /// below it, so the result always satisfies the cascade invariant.
    pub fn resolve_path(&self, raw: &SelectionPath) -> SelectionPath {
        let mut resolved = SelectionPath::default();

        let Some(category_id) = raw.category_id else {
            return resolved;
        };
        if self.category(category_id).is_none() {
            return resolved;
        }
        resolved.category_id = Some(category_id);

        let Some(subcategory_id) = raw.subcategory_id else {
            return resolved;
        };
        if self.subcategory(category_id, subcategory_id).is_none() {
            return resolved;
        }
        resolved.subcategory_id = Some(subcategory_id);

        let Some(child_id) = raw.child_category_id else {
            return resolved;
        };
        if self.child_category(category_id, subcategory_id, child_id).is_some() {
            resolved.child_category_id = Some(child_id);
        }
        resolved
    }

    /// Fuzzy-search category names across all three levels, best score first.
    /// Used by the mega-menu quick picker.
    pub fn search(&self, query: &str) -> Vec<CategoryMatch> {
        lazy_static::lazy_static! {
            static ref MATCHER: SkimMatcherV2 = SkimMatcherV2::default().ignore_case();
        }

        if query.is_empty() {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let mut matches = Vec::new();

        for category in &self.categories {
            if let Some(score) = MATCHER.fuzzy_match(&category.name, query) {
                matches.push(CategoryMatch {
                    path: SelectionPath::category(category.id),
                    name: category.name.clone(),
                    score,
                });
            }
            for sub in &category.subcategories {
                if let Some(score) = MATCHER.fuzzy_match(&sub.name, query) {
                    matches.push(CategoryMatch {
                        path: SelectionPath::subcategory(category.id, sub.id),
                        name: sub.name.clone(),
                        score,
                    });
                }
                for child in &sub.children {
                    if let Some(score) = MATCHER.fuzzy_match(&child.name, query) {
                        matches.push(CategoryMatch {
                            path: SelectionPath::child(category.id, sub.id, child.id),
                            name: child.name.clone(),
                            score,
                        });
                    }
                }
            }
        }

        // Stable order: best score first, then name for equal scores
        matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

        log::debug!(
            "Category search: {} matches for '{}' in {:?}",
            matches.len(),
            query,
            start.elapsed()
        );

        matches
    }
}
