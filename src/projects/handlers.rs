use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

use super::dto::{CreateProjectRequest, Pagination, ProjectPatch};
use super::repo::Project;

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Project name must not be empty"));
    }

    let project = Project::insert(
        &state.db,
        user_id,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.color.as_deref(),
    )
    .await?;

    info!(project_id = %project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = Project::list_by_user(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(projects))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = Project::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok(Json(project))
}

#[instrument(skip(state, patch))]
pub async fn update_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiError> {
    let mut project = Project::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    patch.apply(&mut project);
    if project.name.trim().is_empty() {
        return Err(ApiError::validation("Project name must not be empty"));
    }

    let project = Project::update(&state.db, &project).await?;
    Ok(Json(project))
}

#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Project::delete(&state.db, user_id, id).await? {
        return Err(ApiError::not_found("Project not found"));
    }
    info!(project_id = %id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
