use axum::http::StatusCode;

/// Errors caused by the caller's request body.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The body was absent, not JSON, or not a non-empty object.
    #[error("Missing JSON body")]
    MissingBody,
    /// The `base64Image` field was absent or decoded to nothing.
    #[error("Missing base64Image")]
    MissingImage,
    /// The `type` field was not one of the recognized request kinds.
    #[error("Unsupported type. Use 'analyze' or 'navigate'.")]
    UnsupportedKind,
    /// The image payload was not valid base64.
    #[error("Invalid base64Image: {0}")]
    InvalidImage(#[from] base64::DecodeError),
}

/// Errors raised while talking to the inference backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Credentials are missing or the client could not be constructed.
    #[error("Watson client not configured: {0}")]
    Unavailable(String),
    /// The request never produced a response (connection, DNS, TLS).
    #[error("Request failed: {0}")]
    CallFailed(#[source] reqwest::Error),
    /// No response arrived within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    /// The backend answered with a non-2xx status.
    #[error("{origin} error: {status}")]
    Status {
        origin: &'static str,
        status: reqwest::StatusCode,
    },
    /// The backend answered 2xx but the body was not JSON.
    #[error("Invalid backend response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl BackendError {
    /// Classifies a transport error, separating timeouts from other failures.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(timeout_secs)
        } else {
            BackendError::CallFailed(err)
        }
    }
}

/// Every failure a single inference request can end with.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ProxyError {
    /// Client mistakes map to 400, everything else is the server's problem.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised while assembling the process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read env file {}", path.display())]
    EnvFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("WATSON_NAV_PROMPT_TEMPLATE must contain the {{instruction}} placeholder")]
    MissingPlaceholder,
}
