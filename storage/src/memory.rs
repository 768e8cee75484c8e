//! Process-local record store for tests. The server itself always runs
//! against [`PgRecordStore`](crate::PgRecordStore).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use errors::StoreError;
use parking_lot::RwLock;
use sparks_core::traits::RecordStore;
use sparks_core::types::{Category, Idea, IdeaPatch, IdeaQuery, NewIdea};
use sparks_core::view::{ViewFilters, derive_view};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    ideas: Vec<Idea>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing timestamps, so creation order is always
    /// recoverable from `created_at`.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with categories of the given names.
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for name in names {
                let created_at = inner.next_stamp();
                inner.categories.push(Category {
                    id: Uuid::new_v4(),
                    name: name.into(),
                    created_at,
                });
            }
        }
        store
    }

    pub fn idea_count(&self) -> usize {
        self.inner.read().ideas.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.inner.read().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let mut inner = self.inner.write();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: inner.next_stamp(),
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.write().categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<Idea>, StoreError> {
        let inner = self.inner.read();
        let view = derive_view(&inner.ideas, &ViewFilters::from(query), "");
        Ok(view.into_iter().cloned().collect())
    }

    async fn create_idea(&self, idea: NewIdea) -> Result<Idea, StoreError> {
        let mut inner = self.inner.write();
        let stamp = inner.next_stamp();
        let stored = Idea {
            id: Uuid::new_v4(),
            raw_input: idea.raw_input,
            title: idea.title,
            summary: idea.summary,
            category: idea.category,
            tags: idea.tags,
            priority: idea.priority,
            status: idea.status,
            notes: idea.notes,
            created_at: stamp,
            updated_at: stamp,
        };
        inner.ideas.push(stored.clone());
        Ok(stored)
    }

    async fn update_idea(&self, id: Uuid, patch: &IdeaPatch) -> Result<Idea, StoreError> {
        let mut inner = self.inner.write();
        let stamp = inner.next_stamp();
        let idea = inner
            .ideas
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "idea",
                id: id.to_string(),
            })?;
        patch.apply_to(idea);
        idea.updated_at = stamp;
        Ok(idea.clone())
    }

    async fn delete_idea(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.write().ideas.retain(|i| i.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparks_core::types::{Priority, SortOrder, Status};

    fn new_idea(title: &str, priority: Priority) -> NewIdea {
        NewIdea {
            raw_input: format!("raw {title}"),
            title: title.to_string(),
            summary: format!("{title} summary"),
            category: "Work".to_string(),
            tags: vec!["x".to_string()],
            priority,
            status: Status::Active,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_timestamps() {
        let store = InMemoryRecordStore::new();
        let a = store.create_idea(new_idea("a", Priority::Normal)).await.unwrap();
        let b = store.create_idea(new_idea("b", Priority::Normal)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert!(b.created_at > a.created_at);
    }

    #[tokio::test]
    async fn test_list_sorts_and_filters() {
        let store = InMemoryRecordStore::new();
        store.create_idea(new_idea("n", Priority::Normal)).await.unwrap();
        store.create_idea(new_idea("u", Priority::Urgent)).await.unwrap();
        store.create_idea(new_idea("i", Priority::Important)).await.unwrap();

        let query = IdeaQuery {
            sort: SortOrder::Priority,
            ..IdeaQuery::default()
        };
        let titles: Vec<String> = store
            .list_ideas(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["u", "i", "n"]);

        let newest = store.list_ideas(&IdeaQuery::default()).await.unwrap();
        assert_eq!(newest[0].title, "i");

        let urgent_only = IdeaQuery {
            priority: Some(Priority::Urgent),
            ..IdeaQuery::default()
        };
        assert_eq!(store.list_ideas(&urgent_only).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_combines_filters_with_sort() {
        let store = InMemoryRecordStore::new();
        let mut archived = new_idea("archived", Priority::Urgent);
        archived.status = Status::Archived;
        store.create_idea(archived).await.unwrap();
        let mut health = new_idea("health", Priority::Urgent);
        health.category = "Health".to_string();
        store.create_idea(health).await.unwrap();
        store.create_idea(new_idea("older", Priority::Important)).await.unwrap();
        store.create_idea(new_idea("newer", Priority::Important)).await.unwrap();
        store.create_idea(new_idea("top", Priority::Urgent)).await.unwrap();

        let query = IdeaQuery {
            category: Some("Work".to_string()),
            status: Some(Status::Active),
            sort: SortOrder::Priority,
            ..IdeaQuery::default()
        };
        let titles: Vec<String> = store
            .list_ideas(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["top", "newer", "older"]);

        // no status filter: archived ideas come back too
        let every_status = IdeaQuery {
            sort: SortOrder::Oldest,
            ..IdeaQuery::default()
        };
        let all = store.list_ideas(&every_status).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].title, "archived");
    }

    #[tokio::test]
    async fn test_update_preserves_raw_input_and_bumps_updated_at() {
        let store = InMemoryRecordStore::new();
        let idea = store.create_idea(new_idea("a", Priority::Normal)).await.unwrap();

        let patch = IdeaPatch {
            status: Some(Status::Archived),
            notes: Some(Some("later".to_string())),
            ..IdeaPatch::default()
        };
        let updated = store.update_idea(idea.id, &patch).await.unwrap();

        assert_eq!(updated.status, Status::Archived);
        assert_eq!(updated.notes.as_deref(), Some("later"));
        assert_eq!(updated.raw_input, idea.raw_input);
        assert_eq!(updated.created_at, idea.created_at);
        assert!(updated.updated_at > idea.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store
            .update_idea(Uuid::new_v4(), &IdeaPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "idea", .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryRecordStore::new();
        let idea = store.create_idea(new_idea("a", Priority::Normal)).await.unwrap();

        store.delete_idea(idea.id).await.unwrap();
        store.delete_idea(idea.id).await.unwrap();
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_categories_ordered_by_name_and_deletion_keeps_ideas() {
        let store = InMemoryRecordStore::with_categories(["Work", "Business"]);
        store.create_category("Personal").await.unwrap();
        store.create_idea(new_idea("a", Priority::Normal)).await.unwrap();

        let names: Vec<String> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Business", "Personal", "Work"]);

        let work = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Work")
            .unwrap();
        store.delete_category(work.id).await.unwrap();

        let ideas = store.list_ideas(&IdeaQuery::default()).await.unwrap();
        assert_eq!(ideas[0].category, "Work");
    }
}
