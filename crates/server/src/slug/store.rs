#[cfg(any(test, feature = "test-support"))]
use std::collections::HashSet;
#[cfg(any(test, feature = "test-support"))]
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;

/// Read side of the set of reserved slugs.
///
/// Implementations answer point lookups only. Reservation happens when the
/// caller persists a record under the store's own uniqueness constraint.
#[async_trait]
pub trait SlugStore: Send + Sync {
    /// Returns true when `slug` is currently assigned.
    async fn is_taken(&self, slug: &str) -> Result<bool>;
}

/// In-memory slug set for exercising the resolver without a database.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Debug, Default)]
pub struct MemorySlugStore {
    slugs: Arc<RwLock<HashSet<String>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MemorySlugStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = slugs.into_iter().map(Into::into).collect();
        Self {
            slugs: Arc::new(RwLock::new(set)),
        }
    }

    /// Reserves `slug`, returning false if it was already present.
    pub fn insert(&self, slug: impl Into<String>) -> Result<bool> {
        let mut slugs = self
            .slugs
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire slug set lock: {}", e))?;
        Ok(slugs.insert(slug.into()))
    }

    pub fn len(&self) -> Result<usize> {
        let slugs = self
            .slugs
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire slug set lock: {}", e))?;
        Ok(slugs.len())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl SlugStore for MemorySlugStore {
    async fn is_taken(&self, slug: &str) -> Result<bool> {
        let slugs = self
            .slugs
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire slug set lock: {}", e))?;
        Ok(slugs.contains(slug))
    }
}
