use sqlx::SqlitePool;

use super::db::{SqliteSlugStore, fetch_workspace_for_owner, list_workspaces_for_owner};
use super::models::WorkspaceRecord;
use crate::error::{ServiceError, ServiceResult};
use crate::slug::{Availability, SlugResolver};

pub async fn list_workspaces(
    pool: &SqlitePool,
    owner_id: &str,
) -> ServiceResult<Vec<WorkspaceRecord>> {
    Ok(list_workspaces_for_owner(pool, owner_id).await?)
}

pub async fn get_workspace(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> ServiceResult<WorkspaceRecord> {
    fetch_workspace_for_owner(pool, owner_id, id)
        .await?
        .ok_or(ServiceError::NotFound)
}

/// Read-only availability check for raw user input.
pub async fn check_slug_availability(
    pool: &SqlitePool,
    resolver: &SlugResolver,
    raw: &str,
) -> ServiceResult<Availability> {
    let store = SqliteSlugStore::new(pool);
    resolver
        .check_availability(raw, &store)
        .await?
        .ok_or_else(|| ServiceError::validation("slug must contain at least one letter or digit"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::db::insert_workspace;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn lists_newest_first_and_only_own() {
        let pool = create_test_pool().await.unwrap();
        insert_workspace(&pool, "w1", "alice", "First", "first").await.unwrap();
        insert_workspace(&pool, "w2", "alice", "Second", "second").await.unwrap();
        insert_workspace(&pool, "w3", "bob", "Other", "other").await.unwrap();

        let listed = list_workspaces(&pool, "alice").await.unwrap();
        let slugs: Vec<_> = listed.iter().map(|w| w.slug.as_str()).collect();
        assert_eq!(slugs, ["second", "first"]);
    }

    #[tokio::test]
    async fn availability_reflects_requested_candidate() {
        let pool = create_test_pool().await.unwrap();
        insert_workspace(&pool, "w1", "alice", "Team", "team").await.unwrap();
        let resolver = SlugResolver::default();

        let taken = check_slug_availability(&pool, &resolver, "Team").await.unwrap();
        assert!(!taken.available);
        assert_eq!(taken.suggestion, "team1");

        let free = check_slug_availability(&pool, &resolver, "alpha").await.unwrap();
        assert!(free.available);
        assert_eq!(free.suggestion, "alpha");
    }

    #[tokio::test]
    async fn availability_rejects_empty_normalization() {
        let pool = create_test_pool().await.unwrap();
        let err = check_slug_availability(&pool, &SlugResolver::default(), "!!!")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
