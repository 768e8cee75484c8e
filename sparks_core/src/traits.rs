//! Seams to the external collaborators: the hosted completion endpoint and the
//! relational record store.

use async_trait::async_trait;
use errors::{CompletionError, StoreError};
use uuid::Uuid;

use crate::types::{Category, Idea, IdeaPatch, IdeaQuery, NewIdea};

/// Text-completion endpoint. One call, no retries.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

/// Persistence for categories and ideas.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn create_category(&self, name: &str) -> Result<Category, StoreError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<Idea>, StoreError>;

    async fn create_idea(&self, idea: NewIdea) -> Result<Idea, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no idea has `id`.
    async fn update_idea(&self, id: Uuid, patch: &IdeaPatch) -> Result<Idea, StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete_idea(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
