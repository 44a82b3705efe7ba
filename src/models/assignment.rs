use super::envelope::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_progreso")]
    InProgress,
    #[serde(rename = "completado")]
    Completed,
    #[serde(rename = "vencido")]
    Overdue,
    #[serde(other)]
    Unknown,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InProgress => "en_progreso",
            Self::Completed => "completado",
            Self::Overdue => "vencido",
            Self::Unknown => "desconocido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssignmentPriority {
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "critica")]
    Critical,
    #[serde(other)]
    Unknown,
}

impl AssignmentPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "baja",
            Self::Medium => "media",
            Self::High => "alta",
            Self::Critical => "critica",
            Self::Unknown => "desconocida",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<AssignmentPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<AssignmentStatus>,
    pub priority: Option<AssignmentPriority>,
    /// Only used by the staff listing.
    pub project: Option<String>,
    pub search: Option<String>,
}

impl AssignmentFilters {
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
        if let Some(priority) = self.priority {
            query.push(("priority".to_string(), priority.as_str().to_string()));
        }
        if let Some(project) = self.project.as_deref().filter(|p| !p.is_empty()) {
            query.push(("project".to_string(), project.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        query
    }
}

/// Dashboard counters over a user's assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub high_priority: usize,
    pub critical_priority: usize,
}

impl AssignmentStats {
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        assignments.iter().fold(
            Self {
                total: assignments.len(),
                ..Self::default()
            },
            |mut stats, assignment| {
                match assignment.status {
                    Some(AssignmentStatus::Pending) => stats.pending += 1,
                    Some(AssignmentStatus::InProgress) => stats.in_progress += 1,
                    Some(AssignmentStatus::Completed) => stats.completed += 1,
                    Some(AssignmentStatus::Overdue) => stats.overdue += 1,
                    Some(AssignmentStatus::Unknown) | None => {}
                }
                match assignment.priority {
                    Some(AssignmentPriority::High) => stats.high_priority += 1,
                    Some(AssignmentPriority::Critical) => stats.critical_priority += 1,
                    _ => {}
                }
                stats
            },
        )
    }
}
