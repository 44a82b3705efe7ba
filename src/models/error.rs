#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication error: {}", .0.as_deref().unwrap_or("session expired"))]
    AuthError(Option<String>),

    #[error("Permission denied: {}", .0.as_deref().unwrap_or("insufficient role"))]
    Forbidden(Option<String>),

    #[error("Not found: {}", .0.as_deref().unwrap_or("resource does not exist"))]
    NotFound(Option<String>),

    #[error("Client error {status}: {}", .message.as_deref().unwrap_or("request rejected"))]
    ClientError {
        status: u16,
        message: Option<String>,
    },

    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("internal error"))]
    ServerError {
        status: u16,
        message: Option<String>,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AppError {
    /// HTTP status behind the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::AuthError(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Message supplied by the server in the error body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::AuthError(message) | Self::Forbidden(message) | Self::NotFound(message) => {
                message.as_deref()
            }
            Self::ClientError { message, .. } | Self::ServerError { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Text to show the user: the server's message when it sent one,
    /// the validation reason for pre-flight failures, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::ValidationError(reason) => reason.clone(),
            _ => self
                .server_message()
                .filter(|message| !message.trim().is_empty())
                .map_or_else(|| fallback.to_string(), str::to_string),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::DataError(format!("Invalid JSON: {error}"))
    }
}
