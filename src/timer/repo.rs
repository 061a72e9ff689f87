use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A tracked interval of work. `end_time = NULL` means the entry is still
/// running; `duration` is derived on stop or update, never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub duration: Option<f64>,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub struct NewTimeEntry<'a> {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub description: &'a str,
    pub start_time: OffsetDateTime,
    pub tags: &'a [String],
}

const COLUMNS: &str =
    "id, user_id, project_id, description, start_time, end_time, duration, tags, created_at, updated_at";

impl TimeEntry {
    pub async fn find_running(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<TimeEntry>> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {COLUMNS} FROM time_entries WHERE user_id = $1 AND end_time IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<Option<TimeEntry>> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {COLUMNS} FROM time_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<TimeEntry>> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            "SELECT {COLUMNS} FROM time_entries WHERE user_id = $1
             ORDER BY start_time DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Inserts a running entry. The partial unique index on
    /// `(user_id) WHERE end_time IS NULL` rejects a second running entry,
    /// which callers map to a conflict.
    pub async fn insert(db: &PgPool, new: &NewTimeEntry<'_>) -> sqlx::Result<TimeEntry> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            "INSERT INTO time_entries (user_id, project_id, description, start_time, tags)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.project_id)
        .bind(new.description)
        .bind(new.start_time)
        .bind(new.tags)
        .fetch_one(db)
        .await
    }

    /// Full-record update keyed by id; bumps `updated_at`.
    pub async fn update(db: &PgPool, entry: &TimeEntry) -> sqlx::Result<TimeEntry> {
        sqlx::query_as::<_, TimeEntry>(&format!(
            "UPDATE time_entries
             SET project_id = $3, description = $4, start_time = $5, end_time = $6,
                 duration = $7, tags = $8, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.project_id)
        .bind(&entry.description)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(entry.duration)
        .bind(&entry.tags)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
