use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::AppState;
use super::workspaces;
use crate::config::ServerSettings;
use crate::metrics_exporter::render_metrics;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

pub async fn metrics_handler() -> String {
    render_metrics()
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

pub fn build_api_router(state: AppState, settings: &ServerSettings) -> Result<Router> {
    let api = Router::new()
        .route("/health", get(health))
        .route("/workspaces/check-slug", get(workspaces::check_slug))
        .route("/workspaces", get(workspaces::list).post(workspaces::create))
        .route(
            "/workspaces/{id}",
            get(workspaces::show)
                .put(workspaces::update)
                .delete(workspaces::remove),
        );

    Ok(Router::new()
        .nest("/api", api)
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(cors_layer(&settings.allowed_origins)?)
        .with_state(state))
}

/// Serve on an already-bound listener until `shutdown` fires
pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

pub async fn run_api(
    state: AppState,
    settings: ServerSettings,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = settings
        .socket_addr()
        .map_err(|e| anyhow::anyhow!(e))?;
    let router = build_api_router(state, &settings)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "workspace API listening");
    serve(listener, router, shutdown).await
}
