//! Slug allocation: normalization of free text plus collision probing
//! against the set of slugs already assigned to workspaces.

pub mod normalize;
pub mod resolver;
pub mod store;

pub use normalize::normalize;
pub use resolver::{Availability, SlugError, SlugResolver};
pub use store::SlugStore;
#[cfg(any(test, feature = "test-support"))]
pub use store::MemorySlugStore;
