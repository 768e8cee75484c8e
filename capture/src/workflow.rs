//! The capture pipeline: raw text, AI draft, human review, persisted idea.
//!
//! Each operation awaits at most one completion call and a handful of store
//! calls in sequence. Nothing is retried and nothing is compensated.

use errors::CaptureError;
use sparks_core::traits::RecordStore;
use sparks_core::types::{
    AiResult, Category, Idea, IdeaDraft, IdeaPatch, IdeaQuery, NewIdea, Status, sanitize_tags,
};
use sparks_core::view::matches_search;
use std::sync::Arc;
use uuid::Uuid;

use crate::normalizer::Normalizer;

pub struct CaptureWorkflow {
    store: Arc<dyn RecordStore>,
    normalizer: Normalizer,
}

impl CaptureWorkflow {
    pub fn new(store: Arc<dyn RecordStore>, normalizer: Normalizer) -> Self {
        Self { store, normalizer }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Produces a reviewable suggestion for `raw_input`.
    pub async fn create_draft(&self, raw_input: &str) -> Result<AiResult, CaptureError> {
        let raw_input = raw_input.trim();
        if raw_input.is_empty() {
            return Err(CaptureError::validation("rawInput"));
        }

        let categories: Vec<String> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        tracing::debug!(
            input_chars = raw_input.chars().count(),
            categories = categories.len(),
            "Creating draft",
        );
        Ok(self.normalizer.normalize(raw_input, &categories).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CaptureError> {
        Ok(self.store.list_categories().await?)
    }

    /// Persists a category, typically one the normalizer proposed.
    pub async fn accept_category(&self, name: &str) -> Result<Category, CaptureError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CaptureError::validation("name"));
        }
        Ok(self.store.create_category(name).await?)
    }

    /// Ideas keep their category name after the category is deleted.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CaptureError> {
        self.store.delete_category(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// Validates a reviewed draft and stores it as an active idea.
    pub async fn confirm_idea(&self, draft: IdeaDraft) -> Result<Idea, CaptureError> {
        if draft.raw_input.trim().is_empty() {
            return Err(CaptureError::validation("raw_input"));
        }
        let title = required(&draft.title, "title")?;
        let summary = required(&draft.summary, "summary")?;
        let category = required(&draft.category, "category")?;

        let idea = self
            .store
            .create_idea(NewIdea {
                raw_input: draft.raw_input,
                title,
                summary,
                category,
                tags: sanitize_tags(&draft.tags),
                priority: draft.priority,
                status: Status::Active,
                notes: None,
            })
            .await?;

        metrics::counter!("sparks_ideas_created_total").increment(1);
        tracing::info!(idea_id = %idea.id, category = %idea.category, "Idea captured");
        Ok(idea)
    }

    /// Applies a partial edit. The stored raw input is never touched.
    pub async fn update_idea(&self, id: Uuid, mut patch: IdeaPatch) -> Result<Idea, CaptureError> {
        if let Some(title) = patch.title.as_deref() {
            patch.title = Some(required(title, "title")?);
        }
        if let Some(summary) = patch.summary.as_deref() {
            patch.summary = Some(required(summary, "summary")?);
        }
        if let Some(category) = patch.category.as_deref() {
            patch.category = Some(required(category, "category")?);
        }
        if let Some(tags) = patch.tags.take() {
            patch.tags = Some(sanitize_tags(&tags));
        }

        let idea = self.store.update_idea(id, &patch).await?;
        tracing::info!(idea_id = %id, status = %idea.status, "Idea updated");
        Ok(idea)
    }

    pub async fn delete_idea(&self, id: Uuid) -> Result<(), CaptureError> {
        self.store.delete_idea(id).await?;
        tracing::info!(idea_id = %id, "Idea deleted");
        Ok(())
    }

    /// Structured filters run in the store; free-text search runs here.
    pub async fn list_ideas(
        &self,
        query: &IdeaQuery,
        search: &str,
    ) -> Result<Vec<Idea>, CaptureError> {
        let mut ideas = self.store.list_ideas(query).await?;
        ideas.retain(|idea| matches_search(idea, search));
        Ok(ideas)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CaptureError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CaptureError::validation(field))
    } else {
        Ok(trimmed.to_string())
    }
}
