use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::Duration;
use tracing::instrument;

use crate::{
    auth::AuthUser, error::ApiError, projects::repo::Project, state::AppState,
    timer::repo::TimeEntry,
};

use super::filter::{self, EntryFilter, SummaryRange};
use super::summary::{self, DailyBucket, ProjectBucket, TagBucket};

const DAILY_WINDOW: Duration = Duration::days(7);
const PROJECT_WINDOW: Duration = Duration::days(30);
const TAG_WINDOW: Duration = Duration::days(30);

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/time-entries", post(filtered_entries))
        .route("/reports/summary/daily", get(daily_summary))
        .route("/reports/summary/project", get(project_summary))
        .route("/reports/summary/tags", get(tag_summary))
}

#[instrument(skip(state, body))]
pub async fn filtered_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EntryFilter>,
) -> Result<Json<Vec<TimeEntry>>, ApiError> {
    let entries = filter::find_entries(&state.db, user_id, &body).await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<SummaryRange>,
) -> Result<Json<Vec<DailyBucket>>, ApiError> {
    let window = range.into_filter(state.clock.now(), DAILY_WINDOW);
    let entries = filter::find_entries(&state.db, user_id, &window).await?;
    Ok(Json(summary::daily(&entries)))
}

#[instrument(skip(state))]
pub async fn project_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<SummaryRange>,
) -> Result<Json<Vec<ProjectBucket>>, ApiError> {
    let window = range.into_filter(state.clock.now(), PROJECT_WINDOW);
    let entries = filter::find_entries(&state.db, user_id, &window).await?;
    let names = Project::name_map(&state.db, user_id).await?;
    Ok(Json(summary::by_project(&entries, &names)))
}

#[instrument(skip(state))]
pub async fn tag_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<SummaryRange>,
) -> Result<Json<Vec<TagBucket>>, ApiError> {
    let window = range.into_filter(state.clock.now(), TAG_WINDOW);
    let entries = filter::find_entries(&state.db, user_id, &window).await?;
    Ok(Json(summary::by_tag(&entries)))
}
