use super::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Page information returned by paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// The pagination of an empty result set.
    pub fn empty() -> Self {
        Self {
            page: 1,
            total: 0,
            total_pages: 0,
        }
    }
}

/// The uniform result of every domain service call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn ok_paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
            pagination: self.pagination,
        }
    }

    /// Builds an envelope from a transport outcome, locating the entity under
    /// the first of `keys` present in the payload.
    pub fn from_result(result: Result<Payload, AppError>, keys: &[&str], fallback: &str) -> Self
    where
        T: DeserializeOwned,
    {
        match result {
            Ok(payload) => payload.into_envelope(keys, fallback),
            Err(e) => Self::failure(e.user_message(fallback)),
        }
    }
}

impl<T: DeserializeOwned> ResponseEnvelope<Vec<T>> {
    /// Like [`ResponseEnvelope::from_result`], but records that fail to
    /// decode are dropped instead of failing the whole page.
    pub fn from_listing(result: Result<Payload, AppError>, keys: &[&str], fallback: &str) -> Self {
        match result {
            Ok(payload) => payload.into_listing(keys, fallback),
            Err(e) => Self::failure(e.user_message(fallback)),
        }
    }

    /// Listing that never fails to render: a transport error or an
    /// unexpected body shape becomes an empty page.
    pub fn or_empty(result: Result<Payload, AppError>, keys: &[&str], fallback: &str) -> Self {
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Listing unavailable, showing an empty page");
                return Self::ok_paginated(Vec::new(), Pagination::empty());
            }
        };
        if !payload.is_success() {
            return Self::failure(payload.message().unwrap_or_else(|| fallback.to_string()));
        }

        let pagination = payload.pagination().unwrap_or_else(Pagination::empty);
        match payload.extract_items(keys) {
            Ok(items) => Self {
                success: true,
                data: Some(items.unwrap_or_default()),
                message: payload.message(),
                pagination: Some(pagination),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Unexpected listing shape, showing an empty page");
                Self::ok_paginated(Vec::new(), pagination)
            }
        }
    }
}

impl ResponseEnvelope<()> {
    /// A successful outcome that carries only a message.
    pub fn done(message: impl Into<String>) -> Self {
        Self::ok(()).with_message(message)
    }

    /// Envelope for endpoints whose response body only matters for its
    /// success flag and message.
    pub fn acknowledge(result: Result<Payload, AppError>, success: &str, fallback: &str) -> Self {
        match result {
            Ok(payload) if payload.is_success() => Self::done(success),
            Ok(payload) => Self::failure(payload.message().unwrap_or_else(|| fallback.to_string())),
            Err(e) => Self::failure(e.user_message(fallback)),
        }
    }
}

/// Body of a 2xx response. Every upstream response convention is translated
/// here: `success: bool`, `status: "success"`, and `_id` versus `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parses a response body; an empty body is a payload of `null`.
    pub fn from_bytes(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Null));
        }
        serde_json::from_slice(body)
            .map(Self)
            .map_err(|e| AppError::DataError(format!("Failed to parse response: {e}")))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// `success` wins over `status`; a body with neither counts as success.
    pub fn is_success(&self) -> bool {
        if let Some(flag) = self.0.get("success").and_then(Value::as_bool) {
            return flag;
        }
        match self.0.get("status") {
            Some(Value::String(status)) => status.eq_ignore_ascii_case("success"),
            _ => true,
        }
    }

    pub fn message(&self) -> Option<String> {
        self.0
            .get("message")
            .or_else(|| self.0.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.0
            .get("pagination")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Entity found under the first of `keys` holding a non-null value, with
    /// identifiers normalized.
    pub fn extract<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<Option<T>, AppError> {
        let Some(found) = self.find(keys) else {
            return Ok(None);
        };

        let mut value = found.clone();
        normalize_ids(&mut value);
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::DataError(format!("Unexpected response shape: {e}")))
    }

    /// Records of the list found under the first of `keys`. A record that
    /// fails to decode is logged and skipped; a value that is not a list is
    /// an error.
    pub fn extract_items<T: DeserializeOwned>(
        &self,
        keys: &[&str],
    ) -> Result<Option<Vec<T>>, AppError> {
        let Some(found) = self.find(keys) else {
            return Ok(None);
        };
        let Value::Array(items) = found else {
            return Err(AppError::DataError(
                "Unexpected response shape: expected a list".to_string(),
            ));
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut item = item.clone();
            normalize_ids(&mut item);
            match serde_json::from_value(item) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(index, error = %e, "Skipping malformed record"),
            }
        }
        Ok(Some(records))
    }

    fn find(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .find_map(|key| self.0.get(*key).filter(|value| !value.is_null()))
    }

    pub fn into_listing<T: DeserializeOwned>(
        self,
        keys: &[&str],
        fallback: &str,
    ) -> ResponseEnvelope<Vec<T>> {
        if !self.is_success() {
            return ResponseEnvelope::failure(self.message().unwrap_or_else(|| fallback.to_string()));
        }

        match self.extract_items(keys) {
            Ok(data) => ResponseEnvelope {
                success: true,
                data,
                message: self.message(),
                pagination: self.pagination(),
            },
            Err(e) => {
                tracing::error!(error = %e, "Discarding malformed listing");
                ResponseEnvelope::failure(fallback)
            }
        }
    }

    pub fn into_envelope<T: DeserializeOwned>(
        self,
        keys: &[&str],
        fallback: &str,
    ) -> ResponseEnvelope<T> {
        if !self.is_success() {
            return ResponseEnvelope::failure(self.message().unwrap_or_else(|| fallback.to_string()));
        }

        match self.extract(keys) {
            Ok(data) => ResponseEnvelope {
                success: true,
                data,
                message: self.message(),
                pagination: self.pagination(),
            },
            Err(e) => {
                tracing::error!(error = %e, "Discarding malformed response");
                ResponseEnvelope::failure(fallback)
            }
        }
    }
}

/// Field deserializer that reads `null` as the type's default, for optional
/// text the backend sends as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Copies `_id` into `id` (when `id` is missing) and drops `_id`, on an
/// object or on every object of an array.
pub fn normalize_ids(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(normalize_object_id),
        Value::Object(_) => normalize_object_id(value),
        _ => {}
    }
}

fn normalize_object_id(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    if let Some(legacy) = map.remove("_id") {
        map.entry("id").or_insert(legacy);
    }
}
