use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::config::DatabaseSettings;

const WORKSPACES_DB_FILENAME: &str = "workspaces.db";
const DB_PATH_ENV: &str = "WORKSPACES_DB_PATH";

/// Initialize the workspace database, running migrations as needed.
///
/// `WORKSPACES_DB_PATH` takes precedence over the configured directory.
pub async fn init_pool(settings: &DatabaseSettings) -> Result<(SqlitePool, PathBuf)> {
    let db_root = match std::env::var(DB_PATH_ENV) {
        Ok(path) => PathBuf::from(path),
        Err(_) => settings.path.clone().with_context(|| {
            format!("{DB_PATH_ENV} must be set or database.path configured")
        })?,
    };

    let db_root_path = normalize_path(db_root)?;
    std::fs::create_dir_all(&db_root_path)
        .with_context(|| format!("failed to create DB path: {}", db_root_path.display()))?;

    let db_path = db_root_path.join(WORKSPACES_DB_FILENAME);
    let db_uri = format!("sqlite://{}", db_path.to_string_lossy());

    let connect_options = SqliteConnectOptions::from_str(&db_uri)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(path = %db_path.display(), "database ready");

    Ok((pool, db_root_path))
}

pub(crate) fn normalize_path<P: Into<PathBuf>>(path: P) -> Result<PathBuf> {
    let path = path.into();
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to read current working directory")?;
    Ok(cwd.join(path))
}
