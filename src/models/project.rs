use super::envelope::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "planificado")]
    Planning,
    #[serde(rename = "en-desarrollo")]
    InProgress,
    #[serde(rename = "completado")]
    Completed,
    #[serde(rename = "pausado")]
    Paused,
    #[serde(other)]
    Unknown,
}

impl ProjectStatus {
    /// Value used on the wire and in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planificado",
            Self::InProgress => "en-desarrollo",
            Self::Completed => "completado",
            Self::Paused => "pausado",
            Self::Unknown => "desconocido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectCategory {
    #[serde(rename = "investigacion")]
    Research,
    #[serde(rename = "desarrollo")]
    Development,
    #[serde(rename = "extension")]
    Outreach,
    #[serde(other)]
    Unknown,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "investigacion",
            Self::Development => "desarrollo",
            Self::Outreach => "extension",
            Self::Unknown => "otra",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProjectCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query for the project listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<ProjectStatus>,
    pub category: Option<ProjectCategory>,
    pub search: Option<String>,
}

impl ProjectFilters {
    pub fn to_query(&self, default_limit: u32) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.unwrap_or(1).to_string()),
            (
                "limit".to_string(),
                self.limit.unwrap_or(default_limit).to_string(),
            ),
        ];
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_value_uses_hyphen() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::InProgress).unwrap(),
            "en-desarrollo"
        );
        let status: ProjectStatus = serde_json::from_value(json!("en_desarrollo")).unwrap();
        assert_eq!(status, ProjectStatus::Unknown);
    }

    #[test]
    fn test_filters_defaults() {
        let query = ProjectFilters::default().to_query(20);
        assert_eq!(
            query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );
    }

    #[test]
    fn test_filters_skip_empty_search() {
        let filters = ProjectFilters {
            status: Some(ProjectStatus::Paused),
            category: Some(ProjectCategory::Research),
            search: Some(String::new()),
            ..ProjectFilters::default()
        };
        let query = filters.to_query(20);
        assert!(query.contains(&("status".to_string(), "pausado".to_string())));
        assert!(query.contains(&("category".to_string(), "investigacion".to_string())));
        assert!(!query.iter().any(|(key, _)| key == "search"));
    }

    #[test]
    fn test_project_serialization_omits_missing_id() {
        let project = Project {
            title: "Soil sensors".into(),
            ..Project::default()
        };
        let value = serde_json::to_value(&project).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["title"], "Soil sensors");
    }
}
