use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use workspace_server::api::AppState;
use workspace_server::api::auth::TokenKeys;
use workspace_server::api::server::run_api;
use workspace_server::config::loader::load_with_discovery;
use workspace_server::db::init_pool;
use workspace_server::metrics_exporter::init_metrics;
use workspace_server::supervisor::Supervisor;
use workspace_server::workspace::SlugPolicy;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_with_discovery()?;
    init_metrics()?;

    let secret = config.auth.resolve_secret().with_context(|| {
        format!(
            "{} environment variable must be set to the token signing secret",
            config.auth.secret_env
        )
    })?;

    let (pool, db_root) = init_pool(&config.database).await?;
    tracing::info!(db_root = %db_root.display(), "workspace server starting");

    let state = AppState::new(
        pool,
        SlugPolicy::from(&config.slugs),
        TokenKeys::from_secret(secret.as_bytes()),
    );

    let mut supervisor = Supervisor::new();
    let server_settings = config.server.clone();
    supervisor.spawn("api", move |shutdown| run_api(state, server_settings, shutdown));

    supervisor.run().await
}
