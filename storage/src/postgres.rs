use async_trait::async_trait;
use errors::StoreError;
use sparks_core::traits::RecordStore;
use sparks_core::types::{Category, Idea, IdeaPatch, IdeaQuery, NewIdea, SortOrder};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Pool, Postgres, Row};
use std::time::Duration;
use uuid::Uuid;

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool<Postgres>,
}

fn db_err(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Database error");
    StoreError::backend(e.to_string())
}

impl PgRecordStore {
    pub async fn connect(
        url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(url)
            .await
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Creates tables and indexes. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS categories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ideas (
                id UUID PRIMARY KEY,
                raw_input TEXT NOT NULL,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                category TEXT NOT NULL,
                tags TEXT[] NOT NULL DEFAULT '{}',
                priority TEXT NOT NULL DEFAULT 'normal'
                    CHECK (priority IN ('normal', 'important', 'urgent')),
                status TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'actioned', 'archived')),
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CHECK (cardinality(tags) <= 3)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ideas_created_at ON ideas(created_at)")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    Ok(Category {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn idea_from_row(row: &PgRow) -> Result<Idea, StoreError> {
    let priority: String = row.try_get("priority").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;

    Ok(Idea {
        id: row.try_get("id").map_err(db_err)?,
        raw_input: row.try_get("raw_input").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        summary: row.try_get("summary").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        tags: row.try_get("tags").map_err(db_err)?,
        priority: priority
            .parse()
            .map_err(|_| StoreError::backend(format!("Invalid priority in row: {priority}")))?,
        status: status
            .parse()
            .map_err(|_| StoreError::backend(format!("Invalid status in row: {status}")))?,
        notes: row.try_get("notes").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

const LIST_NEWEST: &str = "SELECT id, raw_input, title, summary, category, tags, priority, status,
            notes, created_at, updated_at
     FROM ideas
     WHERE ($1::text IS NULL OR category = $1)
       AND ($2::text IS NULL OR status = $2)
       AND ($3::text IS NULL OR priority = $3)
     ORDER BY created_at DESC";

const LIST_OLDEST: &str = "SELECT id, raw_input, title, summary, category, tags, priority, status,
            notes, created_at, updated_at
     FROM ideas
     WHERE ($1::text IS NULL OR category = $1)
       AND ($2::text IS NULL OR status = $2)
       AND ($3::text IS NULL OR priority = $3)
     ORDER BY created_at ASC";

// Text ordering on priority would rank normal above important.
const LIST_BY_PRIORITY: &str = "SELECT id, raw_input, title, summary, category, tags, priority,
            status, notes, created_at, updated_at
     FROM ideas
     WHERE ($1::text IS NULL OR category = $1)
       AND ($2::text IS NULL OR status = $2)
       AND ($3::text IS NULL OR priority = $3)
     ORDER BY CASE priority WHEN 'urgent' THEN 3 WHEN 'important' THEN 2 ELSE 1 END DESC,
              created_at DESC";

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(category_from_row).collect()
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let row = sqlx::query(
            "INSERT INTO categories (id, name, created_at) VALUES ($1, $2, now())
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let category = category_from_row(&row)?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<Idea>, StoreError> {
        let sql = match query.sort {
            SortOrder::Newest => LIST_NEWEST,
            SortOrder::Oldest => LIST_OLDEST,
            SortOrder::Priority => LIST_BY_PRIORITY,
        };

        let rows = sqlx::query(sql)
            .bind(query.category.as_deref())
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.priority.map(|p| p.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        tracing::debug!(row_count = rows.len(), sort = %query.sort, "Fetched idea rows");
        rows.iter().map(idea_from_row).collect()
    }

    async fn create_idea(&self, idea: NewIdea) -> Result<Idea, StoreError> {
        let row = sqlx::query(
            "INSERT INTO ideas
             (id, raw_input, title, summary, category, tags, priority, status, notes,
              created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
             RETURNING id, raw_input, title, summary, category, tags, priority, status,
                       notes, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&idea.raw_input)
        .bind(&idea.title)
        .bind(&idea.summary)
        .bind(&idea.category)
        .bind(&idea.tags)
        .bind(idea.priority.as_str())
        .bind(idea.status.as_str())
        .bind(idea.notes.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        idea_from_row(&row)
    }

    async fn update_idea(&self, id: Uuid, patch: &IdeaPatch) -> Result<Idea, StoreError> {
        let row = sqlx::query(
            "UPDATE ideas SET
                title = COALESCE($2::text, title),
                summary = COALESCE($3::text, summary),
                category = COALESCE($4::text, category),
                tags = COALESCE($5::text[], tags),
                priority = COALESCE($6::text, priority),
                status = COALESCE($7::text, status),
                notes = CASE WHEN $8::boolean THEN $9::text ELSE notes END,
                updated_at = now()
             WHERE id = $1
             RETURNING id, raw_input, title, summary, category, tags, priority, status,
                       notes, created_at, updated_at",
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.summary.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.tags.clone())
        .bind(patch.priority.map(|p| p.as_str()))
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.notes.is_some())
        .bind(patch.notes.clone().flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => idea_from_row(&row),
            None => Err(StoreError::NotFound {
                kind: "idea",
                id: id.to_string(),
            }),
        }
    }

    async fn delete_idea(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        tracing::debug!(idea_id = %id, rows = result.rows_affected(), "Idea deleted");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
