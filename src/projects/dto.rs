use serde::Deserialize;

use crate::projects::repo::Project;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update. Absent fields are left untouched; `description` and
/// `color` distinguish "absent" from an explicit null, which clears them.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub color: Option<Option<String>>,
    pub is_archived: Option<bool>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ProjectPatch {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(color) = self.color {
            project.color = color;
        }
        if let Some(is_archived) = self.is_archived {
            project.is_archived = is_archived;
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn sample_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Website".into(),
            description: Some("company site".into()),
            color: Some("#ff0000".into()),
            is_archived: false,
            created_at: datetime!(2025-03-01 09:00:00 UTC),
            updated_at: datetime!(2025-03-01 09:00:00 UTC),
        }
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let mut project = sample_project();
        let patch = ProjectPatch {
            name: Some("Relaunch".into()),
            is_archived: Some(true),
            ..Default::default()
        };
        patch.apply(&mut project);
        assert_eq!(project.name, "Relaunch");
        assert!(project.is_archived);
        assert_eq!(project.description.as_deref(), Some("company site"));
        assert_eq!(project.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn patch_null_clears_optional_field() {
        let mut project = sample_project();
        let patch: ProjectPatch =
            serde_json::from_str(r#"{"description": null}"#).expect("valid patch json");
        patch.apply(&mut project);
        assert_eq!(project.description, None);
        assert_eq!(project.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn absent_field_is_not_a_clear() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"name": "X"}"#).expect("valid json");
        assert!(patch.description.is_none());
        assert!(patch.color.is_none());
    }
}
