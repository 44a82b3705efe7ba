use super::envelope::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[serde(rename = "enviado")]
    Submitted,
    #[serde(rename = "pendiente_revision")]
    UnderReview,
    #[serde(rename = "revisado")]
    Reviewed,
    #[serde(rename = "aprobado")]
    Approved,
    #[serde(rename = "rechazado")]
    Rejected,
    #[serde(other)]
    Unknown,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "enviado",
            Self::UnderReview => "pendiente_revision",
            Self::Reviewed => "revisado",
            Self::Approved => "aprobado",
            Self::Rejected => "rechazado",
            Self::Unknown => "desconocido",
        }
    }
}

/// Metadata of a file attached to a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Assignment id, or the populated assignment object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub files: Vec<SubmissionFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text part of a new submission; files travel separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSubmission {
    pub assignment: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeData {
    pub grade: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub assignment: Option<String>,
    pub status: Option<SubmissionStatus>,
    /// Only used when listing the submissions of an assignment.
    pub student: Option<String>,
}

impl SubmissionFilters {
    pub fn to_query(&self, default_limit: u32) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.unwrap_or(1).to_string()),
            (
                "limit".to_string(),
                self.limit.unwrap_or(default_limit).to_string(),
            ),
        ];
        if let Some(assignment) = self.assignment.as_deref().filter(|a| !a.is_empty()) {
            query.push(("assignment".to_string(), assignment.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(student) = self.student.as_deref().filter(|s| !s.is_empty()) {
            query.push(("student".to_string(), student.to_string()));
        }
        query
    }
}
