use crate::models::error::AppError;
use crate::services::retry::RetryPolicy;
use reqwest::Url;

/// Configuration constants for the application
pub struct Config;

impl Config {
    /// Host used when no override is configured
    pub const DEFAULT_API_HOST: &'static str =
        "https://semillero-guia-backend-0fb6e19b1407.herokuapp.com";

    /// Environment variable overriding the API host
    pub const API_URL_ENV: &'static str = "SEMILLERO_API_URL";

    /// Path prefix shared by every endpoint
    pub const API_PREFIX: &'static str = "/api";

    /// Transport timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Minimum spacing between the start of two requests (1 second)
    pub const MIN_REQUEST_DELAY_MS: u64 = 1_000;

    /// Window during which repeated throttling notices are suppressed (30 seconds)
    pub const THROTTLE_NOTICE_COOLDOWN_MS: u64 = 30_000;

    /// Retries after the first attempt when the server answers 429
    pub const MAX_RETRY_ATTEMPTS: u32 = 3;

    /// First backoff delay, doubled on every retry (2s, 4s, 8s)
    pub const RETRY_BASE_DELAY_MS: u64 = 2_000;

    /// Maximum number of files per upload
    pub const MAX_FILES: usize = 5;

    /// Maximum size of a single uploaded file (10 MiB)
    pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

    /// File extensions accepted for uploads
    pub const ALLOWED_EXTENSIONS: [&'static str; 11] = [
        "pdf", "doc", "docx", "txt", "zip", "rar", "jpg", "jpeg", "png", "mp4", "avi",
    ];

    /// Default page size for general listings
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Default page size for "my ..." listings
    pub const MY_PAGE_SIZE: u32 = 10;

    /// Page size used when computing dashboard statistics
    pub const STATS_PAGE_SIZE: u32 = 100;

    /// Where the browser is sent when the session is no longer valid
    pub const LOGIN_PATH: &'static str = "/login";
}

// API CONFIGURATION
/// Configuration for the portal API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    timeout_secs: u64,
    min_request_delay_ms: u64,
    retry_policy: RetryPolicy,
}

impl ApiConfig {
    /// Creates a builder for constructing an `ApiConfig`.
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::default()
    }

    /// Builds the configuration from `SEMILLERO_API_URL`, falling back to the
    /// value baked in at compile time and then to the default host.
    pub fn from_env() -> Result<Self, AppError> {
        let mut builder = Self::builder();
        if let Some(host) = configured_host() {
            builder = builder.base_url(host);
        }
        builder.build()
    }

    /// Returns the API root, `/api` included.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn min_request_delay_ms(&self) -> u64 {
        self.min_request_delay_ms
    }

    /// Policy applied to requests that do not carry their own.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn configured_host() -> Option<String> {
    std::env::var(Config::API_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| option_env!("SEMILLERO_API_URL").map(str::to_string))
}

#[cfg(target_arch = "wasm32")]
fn configured_host() -> Option<String> {
    option_env!("SEMILLERO_API_URL").map(str::to_string)
}

// API CONFIGURATION BUILDER
/// Builder for constructing an `ApiConfig` with custom settings.
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    min_request_delay_ms: Option<u64>,
    retry_policy: Option<RetryPolicy>,
}

impl ApiConfigBuilder {
    /// Sets the API host (primarily for testing). A trailing `/api` is optional.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the transport timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the minimum spacing between requests.
    pub fn min_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.min_request_delay_ms = Some(delay_ms);
        self
    }

    /// Sets the default retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Builds the `ApiConfig`.
    pub fn build(self) -> Result<ApiConfig, AppError> {
        let host = self
            .base_url
            .unwrap_or_else(|| Config::DEFAULT_API_HOST.to_string());
        Ok(ApiConfig {
            base_url: api_root(&host)?,
            timeout_secs: self.timeout_secs.unwrap_or(Config::REQUEST_TIMEOUT_SECS),
            min_request_delay_ms: self
                .min_request_delay_ms
                .unwrap_or(Config::MIN_REQUEST_DELAY_MS),
            retry_policy: self.retry_policy.unwrap_or_default(),
        })
    }
}

fn api_root(host: &str) -> Result<Url, AppError> {
    let trimmed = host.trim().trim_end_matches('/');
    let root = if trimmed.ends_with(Config::API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{}", Config::API_PREFIX)
    };

    let url = Url::parse(&root)
        .map_err(|e| AppError::ConfigError(format!("Invalid API URL '{host}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AppError::ConfigError(format!(
            "API URL '{host}' cannot be used as a base"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = ApiConfig::builder().build().unwrap();
        assert_eq!(
            config.base_url().as_str(),
            "https://semillero-guia-backend-0fb6e19b1407.herokuapp.com/api"
        );
        assert_eq!(config.timeout_secs(), 30);
        assert_eq!(config.min_request_delay_ms(), 1_000);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_base_url_gets_api_prefix_once() {
        let plain = ApiConfig::builder()
            .base_url("http://localhost:5000/")
            .build()
            .unwrap();
        assert_eq!(plain.base_url().as_str(), "http://localhost:5000/api");

        let prefixed = ApiConfig::builder()
            .base_url("http://localhost:5000/api")
            .build()
            .unwrap();
        assert_eq!(prefixed.base_url().as_str(), "http://localhost:5000/api");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiConfig::builder().base_url("not a url").build();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_custom_pacing() {
        let config = ApiConfig::builder()
            .min_request_delay_ms(250)
            .retry_policy(RetryPolicy::new(1, 100))
            .build()
            .unwrap();
        assert_eq!(config.min_request_delay_ms(), 250);
        assert_eq!(config.retry_policy().max_retries, 1);
        assert_eq!(config.retry_policy().base_delay_ms, 100);
    }

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(Config::ALLOWED_EXTENSIONS.len(), 11);
        assert!(Config::ALLOWED_EXTENSIONS.contains(&"docx"));
        assert!(!Config::ALLOWED_EXTENSIONS.contains(&"exe"));
    }
}
