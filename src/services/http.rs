use crate::config::ApiConfig;
use crate::models::{envelope::Payload, error::AppError};
use crate::services::{
    clock::{Clock, SystemClock},
    rate_limit::RateLimiter,
    retry::{RetryPolicy, retry_with_backoff},
    session::Session,
    transport::{ApiRequest, Method, MultipartForm, RawResponse, RequestBody, ReqwestTransport, Transport},
};
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;

/// A request relative to the API root, before pacing and retry are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: RequestBody,
    retry: Option<RetryPolicy>,
}

impl Request {
    /// `path` is split on `/`; every piece is percent-encoded on its own.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retry: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends one path segment verbatim, `/` included (e.g. a file name).
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.query.extend(pairs);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, AppError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Overrides the client's retry policy for this request only.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Builds the absolute request against `base`.
    pub fn resolve(&self, base: &Url) -> Result<ApiRequest, AppError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::ConfigError(format!("API URL '{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(self.segments.iter().map(String::as_str));

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }

        Ok(ApiRequest {
            method: self.method,
            url: url.into(),
            body: self.body.clone(),
        })
    }
}

// HTTP CLIENT
/// Paced, retrying client for the portal API. Every domain service goes
/// through one shared instance.
pub struct HttpClient {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    limiter: RateLimiter,
    session: Session,
}

impl HttpClient {
    /// Creates a client backed by `reqwest`, the system clock and the
    /// platform's default session.
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_parts(
            config,
            transport,
            Arc::new(SystemClock),
            Session::default(),
        ))
    }

    pub fn with_parts(
        config: ApiConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        session: Session,
    ) -> Self {
        let limiter = RateLimiter::new(Arc::clone(&clock), config.min_request_delay_ms());
        Self {
            config,
            transport,
            clock,
            limiter,
            session,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Payload, AppError> {
        self.send(Request::get(path).query_pairs(query.iter().cloned()))
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Payload, AppError> {
        self.send(Request::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Payload, AppError> {
        self.send(Request::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Payload, AppError> {
        self.send(Request::delete(path)).await
    }

    /// Sends `request` and parses the JSON body of the 2xx response.
    pub async fn send(&self, request: Request) -> Result<Payload, AppError> {
        let response = self.execute(request).await?;
        Payload::from_bytes(&response.body)
    }

    /// Sends `request` and returns the raw body of the 2xx response.
    pub async fn send_bytes(&self, request: Request) -> Result<Vec<u8>, AppError> {
        Ok(self.execute(request).await?.body)
    }

    async fn execute(&self, request: Request) -> Result<RawResponse, AppError> {
        let policy = request.retry.unwrap_or_else(|| self.config.retry_policy());
        let api_request = request.resolve(self.config.base_url())?;

        let result = retry_with_backoff(
            || self.exchange(&api_request),
            policy,
            &self.limiter,
            self.clock.as_ref(),
        )
        .await;

        if let Err(AppError::AuthError(_)) = &result {
            self.session.invalidate();
        }
        result
    }

    /// One attempt: transport call plus status classification.
    async fn exchange(&self, request: &ApiRequest) -> Result<RawResponse, AppError> {
        tracing::debug!(method = %request.method, url = %request.url, "API request");

        let response = self.transport.send(request).await.inspect_err(|e| {
            tracing::error!(method = %request.method, url = %request.url, error = %e, "Request failed");
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let error = error_for_status(&response);
        match &error {
            AppError::RateLimited { retry_after_secs } => tracing::warn!(
                url = %request.url,
                retry_after_secs = ?retry_after_secs,
                "Too many requests"
            ),
            AppError::AuthError(_) => tracing::warn!(url = %request.url, "Unauthorized"),
            AppError::Forbidden(_) => tracing::warn!(url = %request.url, "Insufficient permissions"),
            AppError::NotFound(_) => tracing::warn!(url = %request.url, "Resource not found"),
            other => tracing::error!(url = %request.url, error = %other, "API error"),
        }
        Err(error)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

/// Creates an error based on HTTP status code.
fn error_for_status(response: &RawResponse) -> AppError {
    let message = Payload::from_bytes(&response.body)
        .ok()
        .and_then(|payload| payload.message())
        .filter(|message| !message.trim().is_empty());

    match response.status {
        429 => AppError::RateLimited {
            retry_after_secs: response.retry_after_secs,
        },
        401 => AppError::AuthError(message),
        403 => AppError::Forbidden(message),
        404 => AppError::NotFound(message),
        status @ 400..=499 => AppError::ClientError { status, message },
        status => AppError::ServerError { status, message },
    }
}
