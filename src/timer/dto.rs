use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StartTimerRequest {
    pub description: String,
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update for a time entry. Absent fields stay as they are;
/// `project_id: null` detaches the entry from its project. `duration` is
/// deliberately not here: it is recomputed from the bounds, never accepted
/// from the client.
#[derive(Debug, Default, Deserialize)]
pub struct TimeEntryPatch {
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub project_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}
