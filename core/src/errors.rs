use thiserror::Error;

/// Errors raised by the session/request client and the flows built on it
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Please log in first")]
    NotAuthenticated,

    #[error("API Error: {status} {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    ResponseShapeError(String),

    #[error("Map unavailable: {0}")]
    WidgetLoadError(String),

    #[error("Credential store error: {0}")]
    CredentialStoreError(String),

    #[error("Request Error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::ResponseShapeError(message.into())
    }

    /// Text shown to the user, preferring the server's own `detail` for API errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { status, body } => {
                format!("{} {}", status, crate::schema::error_detail(body))
            }
            other => other.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
