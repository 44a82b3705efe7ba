use crate::config::ApiConfig;
use crate::models::{error::AppError, file::FileUpload};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text fields and file parts of a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<(String, FileUpload)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.files.push((name.into(), file));
        self
    }

    /// Flattens a serializable object into text fields. Strings are sent as
    /// is, nulls are skipped, everything else as its JSON text.
    pub fn from_fields<B: Serialize + ?Sized>(body: &B) -> Result<Self, AppError> {
        let Value::Object(map) = serde_json::to_value(body)? else {
            return Err(AppError::DataError(
                "Multipart fields must serialize to a JSON object".to_string(),
            ));
        };

        let form = map.into_iter().fold(Self::new(), |form, (key, value)| match value {
            Value::Null => form,
            Value::String(text) => form.text(key, text),
            other => form.text(key, other.to_string()),
        });
        Ok(form)
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[(String, FileUpload)] {
        &self.files
    }

    /// Value of the first text field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn to_reqwest(&self) -> Result<reqwest::multipart::Form, AppError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, file) in &self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| {
                    AppError::ValidationError(format!(
                        "Invalid content type '{}' for {}: {e}",
                        file.content_type, file.name
                    ))
                })?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// One fully resolved HTTP exchange, ready to be (re)sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

/// Status, rate-limit hint and body of a response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after_secs: Option<u64>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after_secs: None,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single HTTP exchange. Only failures without a response are errors.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, AppError>;
}

/// `reqwest`-backed transport. The session cookie travels automatically:
/// through the cookie store natively, through the browser on wasm.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let http = Self::client_builder(config)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn client_builder(config: &ApiConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.timeout_secs()))
    }

    #[cfg(target_arch = "wasm32")]
    fn client_builder(_config: &ApiConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
    }

    /// Converts a reqwest error into an appropriate `AppError`.
    fn classify_error(error: &reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::Network(format!("Request timeout: {error}"))
        } else if error.is_request() {
            AppError::Network(format!("Request error: {error}"))
        } else if error.is_decode() || error.is_body() {
            AppError::Network(format!("Failed to read response: {error}"))
        } else {
            AppError::Network(format!("Network error: {error}"))
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, AppError> {
        let builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
            Method::Put => self.http.put(&request.url),
            Method::Delete => self.http.delete(&request.url),
        };

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(form.to_reqwest()?),
        };

        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify_error(&e))?;

        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify_error(&e))?
            .to_vec();

        Ok(RawResponse {
            status,
            retry_after_secs,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_from_fields() {
        let form = MultipartForm::from_fields(&json!({
            "assignment": "64b7f0c2a1b2c3d4e5f60718",
            "content": "Draft",
            "attempt": 2,
            "comments": null
        }))
        .unwrap();

        assert_eq!(form.field("assignment"), Some("64b7f0c2a1b2c3d4e5f60718"));
        assert_eq!(form.field("content"), Some("Draft"));
        assert_eq!(form.field("attempt"), Some("2"));
        assert_eq!(form.field("comments"), None);
    }

    #[test]
    fn test_form_from_non_object_fails() {
        let result = MultipartForm::from_fields(&json!(["a", "b"]));
        assert!(matches!(result, Err(AppError::DataError(_))));
    }

    #[test]
    fn test_form_collects_files() {
        let form = MultipartForm::new()
            .text("title", "Dataset")
            .file("file", FileUpload::new("data.zip", vec![0; 4]));

        assert_eq!(form.files().len(), 1);
        assert_eq!(form.files()[0].0, "file");
        assert!(form.to_reqwest().is_ok());
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(301, "").is_success());
        assert!(!RawResponse::new(429, "").is_success());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_transport_builds_from_config() {
        let config = ApiConfig::builder().build().unwrap();
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
