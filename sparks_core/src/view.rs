//! List/filter derivation over an already-fetched set of ideas.
//!
//! Everything here is pure: no I/O, and the input slice is never reordered.

use std::cmp::Ordering;

use crate::types::{Idea, IdeaQuery, Priority, SortOrder, Status};

/// Filter state of the idea list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilters {
    pub category: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub sort: SortOrder,
}

impl Default for ViewFilters {
    /// A freshly loaded list shows active ideas, newest first.
    fn default() -> Self {
        Self {
            category: None,
            status: Some(Status::Active),
            priority: None,
            sort: SortOrder::Newest,
        }
    }
}

impl From<&IdeaQuery> for ViewFilters {
    fn from(query: &IdeaQuery) -> Self {
        Self {
            category: query.category.clone(),
            status: query.status,
            priority: query.priority,
            sort: query.sort,
        }
    }
}

impl ViewFilters {
    /// No structured filters at all, newest first.
    pub fn all() -> Self {
        Self {
            status: None,
            ..Self::default()
        }
    }

    fn admits(&self, idea: &Idea) -> bool {
        self.category.as_ref().is_none_or(|c| &idea.category == c)
            && self.status.is_none_or(|s| idea.status == s)
            && self.priority.is_none_or(|p| idea.priority == p)
    }
}

/// Case-insensitive substring match on title, summary, or any tag.
///
/// A blank search matches everything.
pub fn matches_search(idea: &Idea, search: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    idea.title.to_lowercase().contains(&needle)
        || idea.summary.to_lowercase().contains(&needle)
        || idea.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

fn compare(sort: SortOrder, a: &Idea, b: &Idea) -> Ordering {
    match sort {
        SortOrder::Newest => b.created_at.cmp(&a.created_at),
        SortOrder::Oldest => a.created_at.cmp(&b.created_at),
        SortOrder::Priority => b
            .priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.created_at.cmp(&a.created_at)),
    }
}

/// Filters, searches and sorts `ideas` into the displayed sequence.
pub fn derive_view<'a>(ideas: &'a [Idea], filters: &ViewFilters, search: &str) -> Vec<&'a Idea> {
    let mut view: Vec<&Idea> = ideas
        .iter()
        .filter(|idea| filters.admits(idea))
        .filter(|idea| matches_search(idea, search))
        .collect();
    view.sort_by(|a, b| compare(filters.sort, a, b));
    view
}
