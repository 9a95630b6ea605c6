use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::WorkspaceRecord;
use crate::slug::SlugStore;

pub async fn fetch_workspace_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> Result<Option<WorkspaceRecord>, sqlx::Error> {
    sqlx::query_as::<_, WorkspaceRecord>(
        "SELECT id, owner_id, name, slug, created_at FROM workspaces WHERE id = ? AND owner_id = ?",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_workspaces_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<Vec<WorkspaceRecord>, sqlx::Error> {
    sqlx::query_as::<_, WorkspaceRecord>(
        "SELECT id, owner_id, name, slug, created_at FROM workspaces WHERE owner_id = ? \
         ORDER BY created_at DESC, rowid DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn slug_exists(
    pool: &SqlitePool,
    slug: &str,
    excluding_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let exists: Option<i64> = if let Some(excluding_id) = excluding_id {
        sqlx::query_scalar("SELECT 1 FROM workspaces WHERE slug = ? AND id != ? LIMIT 1")
            .bind(slug)
            .bind(excluding_id)
            .fetch_optional(pool)
            .await?
    } else {
        sqlx::query_scalar("SELECT 1 FROM workspaces WHERE slug = ? LIMIT 1")
            .bind(slug)
            .fetch_optional(pool)
            .await?
    };
    Ok(exists.is_some())
}

/// Inserts a workspace row. A slug collision surfaces as a unique-violation
/// database error.
pub async fn insert_workspace(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
    name: &str,
    slug: &str,
) -> Result<WorkspaceRecord, sqlx::Error> {
    sqlx::query_as::<_, WorkspaceRecord>(
        "INSERT INTO workspaces (id, owner_id, name, slug) VALUES (?, ?, ?, ?) \
         RETURNING id, owner_id, name, slug, created_at",
    )
    .bind(id)
    .bind(owner_id)
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
}

/// Returns `None` when no workspace with `id` belongs to `owner_id`.
pub async fn update_workspace_row(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    name: &str,
    slug: &str,
) -> Result<Option<WorkspaceRecord>, sqlx::Error> {
    sqlx::query_as::<_, WorkspaceRecord>(
        "UPDATE workspaces SET name = ?, slug = ? WHERE id = ? AND owner_id = ? \
         RETURNING id, owner_id, name, slug, created_at",
    )
    .bind(name)
    .bind(slug)
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_workspace_row(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM workspaces WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The `workspaces.slug` column viewed as a [`SlugStore`].
///
/// When renaming a workspace its own current slug must not count as taken,
/// so the store can be told to ignore one row.
pub struct SqliteSlugStore<'a> {
    pool: &'a SqlitePool,
    excluding_id: Option<&'a str>,
}

impl<'a> SqliteSlugStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            excluding_id: None,
        }
    }

    pub fn excluding(pool: &'a SqlitePool, workspace_id: &'a str) -> Self {
        Self {
            pool,
            excluding_id: Some(workspace_id),
        }
    }
}

#[async_trait]
impl SlugStore for SqliteSlugStore<'_> {
    async fn is_taken(&self, slug: &str) -> Result<bool> {
        Ok(slug_exists(self.pool, slug, self.excluding_id).await?)
    }
}
