use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

use super::dto::{StartTimerRequest, TimeEntryPatch};
use super::repo::{NewTimeEntry, TimeEntry};

/// Per user the timer is a two-state machine: idle (no entry with a null
/// `end_time`) or running (exactly one such entry). `start` and `stop` are
/// the only transitions; everything else is an error, not a silent no-op.

pub async fn start(
    state: &AppState,
    user_id: Uuid,
    req: StartTimerRequest,
) -> Result<TimeEntry, ApiError> {
    if TimeEntry::find_running(&state.db, user_id).await?.is_some() {
        return Err(ApiError::conflict("You already have a running timer"));
    }

    let new = NewTimeEntry {
        user_id,
        project_id: req.project_id,
        description: &req.description,
        start_time: state.clock.now(),
        tags: &req.tags,
    };

    match TimeEntry::insert(&state.db, &new).await {
        Ok(entry) => {
            info!(entry_id = %entry.id, "timer started");
            Ok(entry)
        }
        // A concurrent start that slipped past the check above lands on the
        // partial unique index instead.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(ApiError::conflict("You already have a running timer"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn stop(state: &AppState, user_id: Uuid) -> Result<TimeEntry, ApiError> {
    let mut entry = TimeEntry::find_running(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No running timer found"))?;

    complete(&mut entry, state.clock.now());
    let entry = TimeEntry::update(&state.db, &entry).await?;
    info!(entry_id = %entry.id, duration = ?entry.duration, "timer stopped");
    Ok(entry)
}

pub async fn current(state: &AppState, user_id: Uuid) -> Result<TimeEntry, ApiError> {
    TimeEntry::find_running(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No running timer found"))
}

/// Closes a running entry at `now`. Duration is the elapsed wall time in
/// seconds, fractional part kept.
fn complete(entry: &mut TimeEntry, now: OffsetDateTime) {
    entry.end_time = Some(now);
    entry.duration = Some((now - entry.start_time).as_seconds_f64());
}

/// Merges a patch into an entry. Only supplied fields change; whenever the
/// merged record has both bounds, `duration` is recomputed from them.
pub fn apply_patch(entry: &mut TimeEntry, patch: TimeEntryPatch) -> Result<(), ApiError> {
    if let Some(description) = patch.description {
        entry.description = description;
    }
    if let Some(start_time) = patch.start_time {
        entry.start_time = start_time;
    }
    if let Some(end_time) = patch.end_time {
        entry.end_time = Some(end_time);
    }
    if let Some(project_id) = patch.project_id {
        entry.project_id = project_id;
    }
    if let Some(tags) = patch.tags {
        entry.tags = tags;
    }

    if let Some(end_time) = entry.end_time {
        if entry.start_time > end_time {
            return Err(ApiError::validation("start_time must not be after end_time"));
        }
        entry.duration = Some((end_time - entry.start_time).as_seconds_f64());
    }
    Ok(())
}
