use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_archived: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Project {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, name, description, color, is_archived, created_at, updated_at
            FROM projects
            WHERE user_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<Option<Project>> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, name, description, color, is_archived, created_at, updated_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> sqlx::Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (user_id, name, description, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, description, color, is_archived, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(color)
        .fetch_one(db)
        .await
    }

    /// Full-record update keyed by id; bumps `updated_at`.
    pub async fn update(db: &PgPool, project: &Project) -> sqlx::Result<Project> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $3, description = $4, color = $5, is_archived = $6, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, description, color, is_archived, created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(project.user_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.color)
        .bind(project.is_archived)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Display names for all of a user's projects, keyed by id.
    pub async fn name_map(db: &PgPool, user_id: Uuid) -> sqlx::Result<HashMap<Uuid, String>> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM projects WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(db)
                .await?;
        Ok(rows.into_iter().collect())
    }
}
