pub mod auth;
pub mod server;
pub mod workspaces;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::workspace::SlugPolicy;
use auth::TokenKeys;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub slugs: SlugPolicy,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(pool: SqlitePool, slugs: SlugPolicy, tokens: TokenKeys) -> Self {
        Self {
            pool,
            slugs,
            tokens: Arc::new(tokens),
        }
    }
}
