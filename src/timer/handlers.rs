use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

use super::dto::{Pagination, StartTimerRequest, TimeEntryPatch};
use super::repo::TimeEntry;
use super::service;

pub fn timer_routes() -> Router<AppState> {
    Router::new()
        .route("/timer/start", post(start_timer))
        .route("/timer/stop", post(stop_timer))
        .route("/timer/current", get(current_timer))
        .route("/timer/entries", get(list_entries))
        .route(
            "/timer/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[instrument(skip(state, payload))]
pub async fn start_timer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<StartTimerRequest>,
) -> Result<(StatusCode, Json<TimeEntry>), ApiError> {
    let entry = service::start(&state, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn stop_timer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TimeEntry>, ApiError> {
    let entry = service::stop(&state, user_id).await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn current_timer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TimeEntry>, ApiError> {
    let entry = service::current(&state, user_id).await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<TimeEntry>>, ApiError> {
    let entries = TimeEntry::list_by_user(&state.db, user_id, p.limit, p.offset).await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TimeEntry>, ApiError> {
    let entry = TimeEntry::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time entry not found"))?;
    Ok(Json(entry))
}

#[instrument(skip(state, patch))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<TimeEntryPatch>,
) -> Result<Json<TimeEntry>, ApiError> {
    let mut entry = TimeEntry::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Time entry not found"))?;

    service::apply_patch(&mut entry, patch)?;
    let entry = TimeEntry::update(&state.db, &entry).await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !TimeEntry::delete(&state.db, user_id, id).await? {
        return Err(ApiError::not_found("Time entry not found"));
    }
    info!(entry_id = %id, "time entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
