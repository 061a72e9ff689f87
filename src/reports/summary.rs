use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::UtcOffset;
use uuid::Uuid;

use crate::timer::repo::TimeEntry;

/// Aggregation over completed entries. Running timers (null `duration`)
/// never participate in a summary.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: String,
    pub total_duration: f64,
    pub entry_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBucket {
    pub project_id: Option<Uuid>,
    pub project_name: String,
    pub total_duration: f64,
    pub entry_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagBucket {
    pub tag: String,
    pub total_duration: f64,
    pub entry_count: u64,
}

const NO_PROJECT: &str = "No Project";

/// Buckets by the UTC calendar date of `start_time`, ascending by date.
pub fn daily(entries: &[TimeEntry]) -> Vec<DailyBucket> {
    let mut buckets: BTreeMap<String, DailyBucket> = BTreeMap::new();
    for entry in entries {
        let Some(duration) = entry.duration else {
            continue;
        };
        let date = entry.start_time.to_offset(UtcOffset::UTC).date().to_string();
        let bucket = buckets.entry(date.clone()).or_insert(DailyBucket {
            date,
            total_duration: 0.0,
            entry_count: 0,
        });
        bucket.total_duration += duration;
        bucket.entry_count += 1;
    }
    buckets.into_values().collect()
}

/// Buckets by project, descending by accumulated duration. Entries without a
/// project land in a sentinel bucket with a null id; ids that no longer
/// resolve keep the sentinel display name.
pub fn by_project(entries: &[TimeEntry], names: &HashMap<Uuid, String>) -> Vec<ProjectBucket> {
    let mut buckets: HashMap<Option<Uuid>, ProjectBucket> = HashMap::new();
    for entry in entries {
        let Some(duration) = entry.duration else {
            continue;
        };
        let bucket = buckets.entry(entry.project_id).or_insert_with(|| {
            let project_name = entry
                .project_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| NO_PROJECT.to_string());
            ProjectBucket {
                project_id: entry.project_id,
                project_name,
                total_duration: 0.0,
                entry_count: 0,
            }
        });
        bucket.total_duration += duration;
        bucket.entry_count += 1;
    }

    let mut result: Vec<ProjectBucket> = buckets.into_values().collect();
    result.sort_by(|a, b| {
        b.total_duration
            .total_cmp(&a.total_duration)
            .then_with(|| a.project_name.cmp(&b.project_name))
    });
    result
}

/// Buckets by tag, descending by accumulated duration. An entry fans out to
/// every tag it carries, so its duration is counted once per tag.
pub fn by_tag(entries: &[TimeEntry]) -> Vec<TagBucket> {
    let mut buckets: HashMap<&str, TagBucket> = HashMap::new();
    for entry in entries {
        let Some(duration) = entry.duration else {
            continue;
        };
        for tag in &entry.tags {
            let bucket = buckets.entry(tag).or_insert_with(|| TagBucket {
                tag: tag.clone(),
                total_duration: 0.0,
                entry_count: 0,
            });
            bucket.total_duration += duration;
            bucket.entry_count += 1;
        }
    }

    let mut result: Vec<TagBucket> = buckets.into_values().collect();
    result.sort_by(|a, b| {
        b.total_duration
            .total_cmp(&a.total_duration)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::OffsetDateTime;

    fn entry(
        start: OffsetDateTime,
        duration: Option<f64>,
        project_id: Option<Uuid>,
        tags: &[&str],
    ) -> TimeEntry {
        TimeEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_id,
            description: "work".into(),
            start_time: start,
            end_time: duration.map(|d| start + time::Duration::seconds_f64(d)),
            duration,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn daily_accumulates_same_utc_date() {
        let entries = vec![
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(3600.0), None, &[]),
            entry(datetime!(2025-03-10 14:00:00 UTC), Some(1800.0), None, &[]),
        ];
        let buckets = daily(&entries);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, "2025-03-10");
        assert_eq!(buckets[0].total_duration, 5400.0);
        assert_eq!(buckets[0].entry_count, 2);
    }

    #[test]
    fn daily_skips_running_entries() {
        let entries = vec![
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(600.0), None, &[]),
            entry(datetime!(2025-03-10 10:00:00 UTC), None, None, &[]),
        ];
        let buckets = daily(&entries);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].entry_count, 1);
        assert_eq!(buckets[0].total_duration, 600.0);
    }

    #[test]
    fn daily_sorted_ascending_by_date() {
        let entries = vec![
            entry(datetime!(2025-03-12 09:00:00 UTC), Some(60.0), None, &[]),
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(60.0), None, &[]),
            entry(datetime!(2025-03-11 09:00:00 UTC), Some(60.0), None, &[]),
        ];
        let dates: Vec<String> = daily(&entries).into_iter().map(|b| b.date).collect();
        assert_eq!(dates, vec!["2025-03-10", "2025-03-11", "2025-03-12"]);
    }

    #[test]
    fn project_buckets_sorted_by_duration_desc() {
        let alpha = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let names =
            HashMap::from([(alpha, "Alpha".to_string()), (beta, "Beta".to_string())]);
        let entries = vec![
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(100.0), Some(alpha), &[]),
            entry(datetime!(2025-03-10 10:00:00 UTC), Some(900.0), Some(beta), &[]),
        ];
        let buckets = by_project(&entries, &names);
        assert_eq!(buckets[0].project_name, "Beta");
        assert_eq!(buckets[0].total_duration, 900.0);
        assert_eq!(buckets[1].project_name, "Alpha");
    }

    #[test]
    fn entries_without_project_use_sentinel_bucket() {
        let entries = vec![entry(
            datetime!(2025-03-10 09:00:00 UTC),
            Some(120.0),
            None,
            &[],
        )];
        let buckets = by_project(&entries, &HashMap::new());
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].project_id, None);
        assert_eq!(buckets[0].project_name, "No Project");
        assert_eq!(buckets[0].entry_count, 1);
    }

    #[test]
    fn unresolved_project_id_keeps_sentinel_name() {
        let ghost = Uuid::new_v4();
        let entries = vec![entry(
            datetime!(2025-03-10 09:00:00 UTC),
            Some(120.0),
            Some(ghost),
            &[],
        )];
        let buckets = by_project(&entries, &HashMap::new());
        assert_eq!(buckets[0].project_id, Some(ghost));
        assert_eq!(buckets[0].project_name, "No Project");
    }

    #[test]
    fn tag_fan_out_counts_duration_once_per_tag() {
        let entries = vec![entry(
            datetime!(2025-03-10 09:00:00 UTC),
            Some(100.0),
            None,
            &["a", "b"],
        )];
        let buckets = by_tag(&entries);
        assert_eq!(buckets.len(), 2);
        assert!(buckets.iter().all(|b| b.total_duration == 100.0));
        assert!(buckets.iter().all(|b| b.entry_count == 1));
        let total: f64 = buckets.iter().map(|b| b.total_duration).sum();
        assert_eq!(total, 200.0);
    }

    #[test]
    fn tag_buckets_sorted_by_duration_then_name() {
        let entries = vec![
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(50.0), None, &["writing"]),
            entry(datetime!(2025-03-10 10:00:00 UTC), Some(500.0), None, &["coding"]),
            entry(datetime!(2025-03-10 11:00:00 UTC), Some(50.0), None, &["admin"]),
        ];
        let tags: Vec<String> = by_tag(&entries).into_iter().map(|b| b.tag).collect();
        assert_eq!(tags, vec!["coding", "admin", "writing"]);
    }

    #[test]
    fn summaries_are_deterministic() {
        let alpha = Uuid::new_v4();
        let names = HashMap::from([(alpha, "Alpha".to_string())]);
        let entries = vec![
            entry(datetime!(2025-03-10 09:00:00 UTC), Some(300.0), Some(alpha), &["a"]),
            entry(datetime!(2025-03-11 09:00:00 UTC), Some(300.0), None, &["b"]),
        ];
        assert_eq!(daily(&entries), daily(&entries));
        assert_eq!(by_project(&entries, &names), by_project(&entries, &names));
        assert_eq!(by_tag(&entries), by_tag(&entries));
    }
}
