use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct WorkspaceRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    pub slug: String,
    pub created_at: String,
}

/// Body of a create or update request. A missing `name` deserializes as
/// empty so it fails name validation rather than body parsing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorkspaceInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl WorkspaceInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}
