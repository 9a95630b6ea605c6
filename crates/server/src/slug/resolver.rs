use serde::Serialize;
use thiserror::Error;

use super::normalize::{normalize, strip_numeric_suffix};
use super::store::SlugStore;

/// Probe cap used when no configuration overrides it.
pub const DEFAULT_MAX_PROBES: u32 = 10_000;

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("slug store query failed: {0}")]
    Store(#[source] anyhow::Error),
    #[error("no free slug for base `{base}` after {attempts} probes")]
    Exhausted { base: String, attempts: u32 },
}

/// Result of a read-only availability check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Whether the normalized candidate itself is free.
    pub available: bool,
    /// The slug that would be assigned right now.
    pub suggestion: String,
}

/// Picks free slugs by probing a [`SlugStore`].
///
/// A taken candidate has its trailing digits stripped to form a base, then
/// `base1`, `base2`, ... are probed until one is free. The counter lives in a
/// single call; nothing is reserved, so the caller still has to persist the
/// result under a uniqueness constraint and retry if that write loses a race.
///
/// With a length limit set, the base is shortened so that `base` plus the
/// counter never exceeds it.
#[derive(Clone, Copy, Debug)]
pub struct SlugResolver {
    max_probes: u32,
    max_length: Option<usize>,
}

impl Default for SlugResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROBES)
    }
}

impl SlugResolver {
    pub fn new(max_probes: u32) -> Self {
        Self {
            max_probes: max_probes.max(1),
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn max_probes(&self) -> u32 {
        self.max_probes
    }

    /// Returns `candidate` if it is free, otherwise the first free suffixed
    /// alternative. `candidate` is expected to be normalized and non-empty.
    pub async fn resolve<S>(&self, candidate: &str, store: &S) -> Result<String, SlugError>
    where
        S: SlugStore + ?Sized,
    {
        metrics::counter!("slug_probes_total").increment(1);
        if !is_taken(store, candidate).await? {
            return Ok(candidate.to_string());
        }

        metrics::counter!("slug_collisions_total").increment(1);
        self.next_free(candidate, store).await
    }

    /// Normalizes `raw` and reports whether it is free along with the slug
    /// that would currently be assigned. Never reserves anything.
    ///
    /// Returns `Ok(None)` when `raw` normalizes to an empty string.
    pub async fn check_availability<S>(
        &self,
        raw: &str,
        store: &S,
    ) -> Result<Option<Availability>, SlugError>
    where
        S: SlugStore + ?Sized,
    {
        let candidate = normalize(raw);
        if candidate.is_empty() {
            return Ok(None);
        }

        metrics::counter!("slug_probes_total").increment(1);
        if !is_taken(store, &candidate).await? {
            return Ok(Some(Availability {
                available: true,
                suggestion: candidate,
            }));
        }

        let suggestion = self.next_free(&candidate, store).await?;
        Ok(Some(Availability {
            available: false,
            suggestion,
        }))
    }

    async fn next_free<S>(&self, taken: &str, store: &S) -> Result<String, SlugError>
    where
        S: SlugStore + ?Sized,
    {
        let base = strip_numeric_suffix(taken);

        for counter in 1..=self.max_probes {
            let probe = self.suffixed(base, counter);
            metrics::counter!("slug_probes_total").increment(1);
            if !is_taken(store, &probe).await? {
                tracing::debug!(slug = %taken, resolved = %probe, probes = counter, "resolved slug collision");
                return Ok(probe);
            }
        }

        metrics::counter!("slug_exhausted_total").increment(1);
        tracing::warn!(base = %base, probes = self.max_probes, "slug probing exhausted");
        Err(SlugError::Exhausted {
            base: base.to_string(),
            attempts: self.max_probes,
        })
    }

    fn suffixed(&self, base: &str, counter: u32) -> String {
        let suffix = counter.to_string();
        let Some(max_length) = self.max_length else {
            return format!("{base}{suffix}");
        };

        // Slug candidates are ASCII, so byte offsets are char boundaries.
        let keep = max_length.saturating_sub(suffix.len()).min(base.len());
        let base = base[..keep].trim_end_matches('-');
        format!("{base}{suffix}")
    }
}

async fn is_taken<S>(store: &S, slug: &str) -> Result<bool, SlugError>
where
    S: SlugStore + ?Sized,
{
    store.is_taken(slug).await.map_err(SlugError::Store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::store::MemorySlugStore;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl SlugStore for FailingStore {
        async fn is_taken(&self, _slug: &str) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    struct EverythingTaken;

    #[async_trait]
    impl SlugStore for EverythingTaken {
        async fn is_taken(&self, _slug: &str) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn free_candidate_is_returned_unchanged() {
        let store = MemorySlugStore::new();
        let slug = SlugResolver::default().resolve("team", &store).await.unwrap();
        assert_eq!(slug, "team");
    }

    #[tokio::test]
    async fn first_collision_appends_one() {
        let store = MemorySlugStore::with_slugs(["team"]);
        let slug = SlugResolver::default().resolve("team", &store).await.unwrap();
        assert_eq!(slug, "team1");
    }

    #[tokio::test]
    async fn skips_taken_suffixes() {
        let store = MemorySlugStore::with_slugs(["team", "team1", "team2"]);
        let slug = SlugResolver::default().resolve("team", &store).await.unwrap();
        assert_eq!(slug, "team3");
    }

    #[tokio::test]
    async fn strips_existing_numeric_suffix_before_probing() {
        let store = MemorySlugStore::with_slugs(["team42"]);
        let slug = SlugResolver::default()
            .resolve("team42", &store)
            .await
            .unwrap();
        assert_eq!(slug, "team1");
    }

    #[tokio::test]
    async fn suffix_attaches_without_separator_after_hyphen_base() {
        let store = MemorySlugStore::with_slugs(["release-2"]);
        let slug = SlugResolver::default()
            .resolve("release-2", &store)
            .await
            .unwrap();
        assert_eq!(slug, "release-1");
    }

    #[tokio::test]
    async fn all_digit_candidate_probes_bare_counters() {
        let store = MemorySlugStore::with_slugs(["2024", "1"]);
        let slug = SlugResolver::default().resolve("2024", &store).await.unwrap();
        assert_eq!(slug, "2");
    }

    #[tokio::test]
    async fn resolution_is_deterministic_for_fixed_store() {
        let store = MemorySlugStore::with_slugs(["alpha", "alpha1", "alpha3"]);
        let resolver = SlugResolver::default();
        let first = resolver.resolve("alpha", &store).await.unwrap();
        let second = resolver.resolve("alpha", &store).await.unwrap();
        assert_eq!(first, "alpha2");
        assert_eq!(first, second);
        assert!(!store.is_taken(&first).await.unwrap());
    }

    #[tokio::test]
    async fn gives_up_after_probe_cap() {
        let err = SlugResolver::new(25)
            .resolve("busy", &EverythingTaken)
            .await
            .unwrap_err();
        match err {
            SlugError::Exhausted { base, attempts } => {
                assert_eq!(base, "busy");
                assert_eq!(attempts, 25);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let err = SlugResolver::default()
            .resolve("team", &FailingStore)
            .await
            .unwrap_err();
        assert!(matches!(err, SlugError::Store(_)));
    }

    #[tokio::test]
    async fn availability_of_free_candidate() {
        let store = MemorySlugStore::new();
        let availability = SlugResolver::default()
            .check_availability("alpha", &store)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            availability,
            Availability {
                available: true,
                suggestion: "alpha".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn availability_normalizes_and_suggests_alternative() {
        let store = MemorySlugStore::with_slugs(["my-team", "my-team1"]);
        let availability = SlugResolver::default()
            .check_availability("  My Team ", &store)
            .await
            .unwrap()
            .unwrap();
        assert!(!availability.available);
        assert_eq!(availability.suggestion, "my-team2");
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn availability_of_unnormalizable_input_is_none() {
        let store = MemorySlugStore::new();
        let availability = SlugResolver::default()
            .check_availability("!!!", &store)
            .await
            .unwrap();
        assert!(availability.is_none());
    }

    #[tokio::test]
    async fn suffixes_fit_within_length_limit() {
        let long = "a".repeat(255);
        let store = MemorySlugStore::with_slugs([long.clone()]);
        let resolver = SlugResolver::default().with_max_length(255);

        let slug = resolver.resolve(&long, &store).await.unwrap();
        assert_eq!(slug.len(), 255);
        assert_eq!(slug, format!("{}1", "a".repeat(254)));
    }

    #[tokio::test]
    async fn shortened_base_drops_dangling_hyphen() {
        let store = MemorySlugStore::with_slugs(["ab-cd", "ab-c1"]);
        let resolver = SlugResolver::default().with_max_length(5);

        // "ab-c1" is already taken.
        let slug = resolver.resolve("ab-cd", &store).await.unwrap();
        assert_eq!(slug, "ab-c2");

        let store = MemorySlugStore::with_slugs(["abc-d"]);
        let slug = SlugResolver::default()
            .with_max_length(5)
            .resolve("abc-d", &store)
            .await
            .unwrap();
        assert_eq!(slug, "abc1");
    }

    #[test]
    fn zero_probe_cap_is_raised_to_one() {
        assert_eq!(SlugResolver::new(0).max_probes(), 1);
    }
}
