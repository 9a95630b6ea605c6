use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::auth::AuthUser;
use crate::error::{ServiceError, ServiceResult};
use crate::slug::Availability;
use crate::workspace::WorkspaceInput;
use crate::workspace::mutations::{create_workspace, delete_workspace, update_workspace};
use crate::workspace::queries::{check_slug_availability, get_workspace, list_workspaces};

#[derive(Debug, Deserialize)]
pub struct CheckSlugParams {
    pub slug: Option<String>,
}

/// `GET /api/workspaces/check-slug?slug=...`, no authentication
pub async fn check_slug(
    State(state): State<AppState>,
    Query(params): Query<CheckSlugParams>,
) -> ServiceResult<Json<Availability>> {
    let slug = params
        .slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::MissingParameter("Slug parameter is required".to_string()))?;

    let availability = check_slug_availability(&state.pool, &state.slugs.resolver, &slug).await?;
    Ok(Json(availability))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<WorkspaceInput>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let Json(input) = payload?;
    let workspace = create_workspace(&state.pool, &state.slugs, &user.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Workspace created successfully",
            "workspace": workspace,
        })),
    ))
}

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ServiceResult<Json<Value>> {
    let workspaces = list_workspaces(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "workspaces": workspaces })))
}

pub async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let workspace = get_workspace(&state.pool, &user.user_id, &id).await?;
    Ok(Json(json!({ "workspace": workspace })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<WorkspaceInput>, JsonRejection>,
) -> ServiceResult<Json<Value>> {
    let Json(input) = payload?;
    let workspace = update_workspace(&state.pool, &state.slugs, &user.user_id, &id, input).await?;
    Ok(Json(json!({
        "message": "Workspace updated successfully",
        "workspace": workspace,
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ServiceResult<Json<Value>> {
    delete_workspace(&state.pool, &user.user_id, &id).await?;
    Ok(Json(json!({ "message": "Workspace deleted successfully" })))
}
