use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::ApiError;
use crate::timer::repo::TimeEntry;

/// Filter over a user's time entries. Unset fields impose no constraint;
/// the set ones apply conjunctively, except `tags` which matches any-of.
#[derive(Debug, Default, Deserialize)]
pub struct EntryFilter {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub project_id: Option<Uuid>,
    pub search_term: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl EntryFilter {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ApiError::validation("end_date must not be before start_date"));
            }
        }
        Ok(())
    }

    fn requested_tags(&self) -> Option<&[String]> {
        self.tags.as_deref().filter(|tags| !tags.is_empty())
    }
}

/// Optional window for the summary endpoints; unset bounds fall back to a
/// default span ending now.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryRange {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

impl SummaryRange {
    pub fn into_filter(self, now: OffsetDateTime, default_span: Duration) -> EntryFilter {
        let end = self.end_date.unwrap_or(now);
        let start = self.start_date.unwrap_or(end - default_span);
        EntryFilter {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }
}

/// Any-of membership: one shared tag is enough.
pub fn matches_any_tag(entry_tags: &[String], wanted: &[String]) -> bool {
    wanted.iter().any(|tag| entry_tags.contains(tag))
}

/// Selects the entries matching the filter, newest first. Date, project and
/// description predicates run in SQL; the tag predicate runs over the fetched
/// rows since it is an array-overlap test on application-ordered tags.
pub async fn find_entries(
    db: &PgPool,
    user_id: Uuid,
    filter: &EntryFilter,
) -> Result<Vec<TimeEntry>, ApiError> {
    filter.validate()?;

    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, user_id, project_id, description, start_time, end_time, duration, tags, \
         created_at, updated_at FROM time_entries WHERE user_id = ",
    );
    query.push_bind(user_id);

    if let Some(start) = filter.start_date {
        query.push(" AND start_time >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query.push(" AND start_time <= ").push_bind(end);
    }
    if let Some(project_id) = filter.project_id {
        query.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(term) = &filter.search_term {
        query
            .push(" AND description ILIKE ")
            .push_bind(format!("%{term}%"));
    }
    query.push(" ORDER BY start_time DESC");

    let mut entries: Vec<TimeEntry> = query.build_query_as().fetch_all(db).await?;

    if let Some(wanted) = filter.requested_tags() {
        entries.retain(|entry| matches_any_tag(&entry.tags, wanted));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn any_of_needs_only_one_shared_tag() {
        assert!(matches_any_tag(&tags(&["x", "y"]), &tags(&["x"])));
        assert!(!matches_any_tag(&tags(&["y"]), &tags(&["x"])));
        assert!(matches_any_tag(&tags(&["a", "b"]), &tags(&["c", "b"])));
    }

    #[test]
    fn empty_entry_tags_never_match() {
        assert!(!matches_any_tag(&[], &tags(&["x"])));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let filter = EntryFilter {
            start_date: Some(datetime!(2025-03-10 00:00:00 UTC)),
            end_date: Some(datetime!(2025-03-01 00:00:00 UTC)),
            ..Default::default()
        };
        assert!(matches!(
            filter.validate().unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn validate_accepts_open_ended_range() {
        let filter = EntryFilter {
            start_date: Some(datetime!(2025-03-10 00:00:00 UTC)),
            ..Default::default()
        };
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn summary_range_defaults_to_span_ending_now() {
        let now = datetime!(2025-03-10 12:00:00 UTC);
        let filter = SummaryRange::default().into_filter(now, Duration::days(7));
        assert_eq!(filter.end_date, Some(now));
        assert_eq!(filter.start_date, Some(datetime!(2025-03-03 12:00:00 UTC)));
    }

    #[test]
    fn summary_range_keeps_explicit_bounds() {
        let now = datetime!(2025-03-10 12:00:00 UTC);
        let range = SummaryRange {
            start_date: Some(datetime!(2025-01-01 00:00:00 UTC)),
            end_date: Some(datetime!(2025-02-01 00:00:00 UTC)),
        };
        let filter = range.into_filter(now, Duration::days(30));
        assert_eq!(filter.start_date, Some(datetime!(2025-01-01 00:00:00 UTC)));
        assert_eq!(filter.end_date, Some(datetime!(2025-02-01 00:00:00 UTC)));
    }

    #[test]
    fn explicit_end_anchors_the_default_start() {
        let now = datetime!(2025-03-10 12:00:00 UTC);
        let range = SummaryRange {
            start_date: None,
            end_date: Some(datetime!(2025-02-01 00:00:00 UTC)),
        };
        let filter = range.into_filter(now, Duration::days(7));
        assert_eq!(filter.start_date, Some(datetime!(2025-01-25 00:00:00 UTC)));
    }
}
