//! Shared types and traits for the Sparks idea service.

pub mod traits;
pub mod types;
pub mod view;

pub use traits::{CompletionService, RecordStore};
pub use types::{
    AiResult, Category, Idea, IdeaDraft, IdeaPatch, IdeaQuery, MAX_TAGS, NewIdea, Priority,
    SortOrder, Status, sanitize_tags,
};
pub use view::{ViewFilters, derive_view, matches_search};
