use sqlx::SqlitePool;

use super::db::{
    SqliteSlugStore, delete_workspace_row, fetch_workspace_for_owner, insert_workspace,
    update_workspace_row,
};
use super::models::{WorkspaceInput, WorkspaceRecord};
use crate::config::SlugSettings;
use crate::error::{ServiceError, ServiceResult, is_unique_violation};
use crate::slug::{SlugResolver, SlugStore, normalize};
use crate::validation::input::{validate_name, validate_requested_slug};
use crate::validation::slug::validate_slug;

/// How slugs are allocated when workspaces are written.
#[derive(Clone, Copy, Debug)]
pub struct SlugPolicy {
    pub resolver: SlugResolver,
    /// Resolve-then-write rounds before a lost race is reported as a duplicate.
    pub reserve_attempts: u32,
    pub max_length: usize,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        Self::from(&SlugSettings::default())
    }
}

impl From<&SlugSettings> for SlugPolicy {
    fn from(settings: &SlugSettings) -> Self {
        Self {
            resolver: SlugResolver::new(settings.max_probes)
                .with_max_length(settings.max_length),
            reserve_attempts: settings.reserve_attempts.max(1),
            max_length: settings.max_length,
        }
    }
}

pub async fn create_workspace(
    pool: &SqlitePool,
    policy: &SlugPolicy,
    owner_id: &str,
    input: WorkspaceInput,
) -> ServiceResult<WorkspaceRecord> {
    let store = SqliteSlugStore::new(pool);
    create_workspace_with_store(pool, &store, policy, owner_id, input).await
}

/// Creates a workspace, probing `store` for a free slug. The insert into
/// `pool` remains the authority on uniqueness whatever `store` reports.
pub async fn create_workspace_with_store<S>(
    pool: &SqlitePool,
    store: &S,
    policy: &SlugPolicy,
    owner_id: &str,
    input: WorkspaceInput,
) -> ServiceResult<WorkspaceRecord>
where
    S: SlugStore + ?Sized,
{
    let name = validate_name(&input.name)?;
    let requested = validate_requested_slug(input.slug.as_deref())?;

    let candidate = normalize(requested.as_deref().unwrap_or(&name));
    validate_slug(&candidate, policy.max_length)?;

    for attempt in 1..=policy.reserve_attempts {
        let slug = policy.resolver.resolve(&candidate, store).await?;
        validate_slug(&slug, policy.max_length)?;

        let id = cuid2::create_id();
        match insert_workspace(pool, &id, owner_id, &name, &slug).await {
            Ok(record) => {
                tracing::info!(workspace_id = %record.id, slug = %record.slug, "workspace created");
                return Ok(record);
            }
            Err(err) if is_unique_violation(&err) => {
                metrics::counter!("workspace_reserve_conflicts_total").increment(1);
                tracing::warn!(slug = %slug, attempt, "slug taken between probe and insert");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(reservation_lost(&candidate, policy.reserve_attempts))
}

/// Renames a workspace. A supplied slug is resolved with the workspace's own
/// current slug treated as free; without one the existing slug is kept.
pub async fn update_workspace(
    pool: &SqlitePool,
    policy: &SlugPolicy,
    owner_id: &str,
    id: &str,
    input: WorkspaceInput,
) -> ServiceResult<WorkspaceRecord> {
    let store = SqliteSlugStore::excluding(pool, id);
    update_workspace_with_store(pool, &store, policy, owner_id, id, input).await
}

/// Like [`update_workspace`], probing `store` for a free slug. `store` should
/// not report the workspace's own current slug as taken.
pub async fn update_workspace_with_store<S>(
    pool: &SqlitePool,
    store: &S,
    policy: &SlugPolicy,
    owner_id: &str,
    id: &str,
    input: WorkspaceInput,
) -> ServiceResult<WorkspaceRecord>
where
    S: SlugStore + ?Sized,
{
    let name = validate_name(&input.name)?;
    let requested = validate_requested_slug(input.slug.as_deref())?;

    let existing = fetch_workspace_for_owner(pool, owner_id, id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let Some(requested) = requested else {
        return update_workspace_row(pool, owner_id, id, &name, &existing.slug)
            .await?
            .ok_or(ServiceError::NotFound);
    };

    let candidate = normalize(&requested);
    validate_slug(&candidate, policy.max_length)?;

    for attempt in 1..=policy.reserve_attempts {
        let slug = policy.resolver.resolve(&candidate, store).await?;
        validate_slug(&slug, policy.max_length)?;

        match update_workspace_row(pool, owner_id, id, &name, &slug).await {
            Ok(Some(record)) => {
                tracing::info!(workspace_id = %record.id, slug = %record.slug, "workspace updated");
                return Ok(record);
            }
            Ok(None) => return Err(ServiceError::NotFound),
            Err(err) if is_unique_violation(&err) => {
                metrics::counter!("workspace_reserve_conflicts_total").increment(1);
                tracing::warn!(slug = %slug, attempt, "slug taken between probe and update");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(reservation_lost(&candidate, policy.reserve_attempts))
}

pub async fn delete_workspace(pool: &SqlitePool, owner_id: &str, id: &str) -> ServiceResult<()> {
    if !delete_workspace_row(pool, owner_id, id).await? {
        return Err(ServiceError::NotFound);
    }
    tracing::info!(workspace_id = %id, "workspace deleted");
    Ok(())
}

fn reservation_lost(candidate: &str, attempts: u32) -> ServiceError {
    ServiceError::Duplicate(format!(
        "slug `{candidate}` kept colliding with concurrent writers after {attempts} attempts"
    ))
}
