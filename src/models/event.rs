use super::envelope::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "seminario")]
    Seminar,
    #[serde(rename = "taller")]
    Workshop,
    #[serde(rename = "conferencia")]
    Conference,
    #[serde(rename = "reunion")]
    Meeting,
    #[serde(rename = "presentacion")]
    Presentation,
    #[serde(other)]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seminar => "seminario",
            Self::Workshop => "taller",
            Self::Conference => "conferencia",
            Self::Meeting => "reunion",
            Self::Presentation => "presentacion",
            Self::Unknown => "otro",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<EventType>,
    /// Day filter in `YYYY-MM-DD` form.
    pub date: Option<String>,
    pub search: Option<String>,
}

impl EventFilters {
    pub fn to_query(&self, default_limit: u32) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.unwrap_or(1).to_string()),
            (
                "limit".to_string(),
                self.limit.unwrap_or(default_limit).to_string(),
            ),
        ];
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.as_str().to_string()));
        }
        if let Some(date) = self.date.as_deref().filter(|d| !d.is_empty()) {
            query.push(("date".to_string(), date.to_string()));
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
    fn test_event_deserialization() {
        let event: Event = serde_json::from_value(json!({
            "id": "64b7f0c2a1b2c3d4e5f60720",
            "title": "ML reading group",
            "category": "seminario",
            "date": "2024-05-10T15:00:00Z",
            "capacity": 40
        }))
        .unwrap();

        assert_eq!(event.category, Some(EventType::Seminar));
        assert_eq!(event.extra["capacity"], 40);
    }

    #[test]
    fn test_filters_query() {
        let filters = EventFilters {
            category: Some(EventType::Workshop),
            date: Some("2024-05-10".into()),
            ..EventFilters::default()
        };
        let query = filters.to_query(20);
        assert!(query.contains(&("category".to_string(), "taller".to_string())));
        assert!(query.contains(&("date".to_string(), "2024-05-10".to_string())));
    }
}
