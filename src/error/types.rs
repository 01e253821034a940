use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors surfaced by the Mistral client.
///
/// Every remote failure ends up here after retries are exhausted. The
/// variants are grouped by [`ErrorCategory`], which drives the retry
/// decision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Caller-supplied input is invalid (blank prompt, blank API key, ...).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Connection could not be established or was dropped.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request exceeded the configured timeout.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// The provider answered with a non-2xx status.
    #[error("Provider error {status}: {message}")]
    ProviderError {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The response body was not the JSON we expected.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The event stream broke or ended before a terminal frame.
    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification of [`LlmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Transport,
    Provider,
    Decode,
    Internal,
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn provider_error(status: u16, message: impl Into<String>) -> Self {
        Self::ProviderError {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError(_) => ErrorCategory::Validation,
            Self::ConnectionError(_) | Self::TimeoutError(_) | Self::StreamError(_) => {
                ErrorCategory::Transport
            }
            Self::ProviderError { .. } => ErrorCategory::Provider,
            Self::DecodeError(_) => ErrorCategory::Decode,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a blocking call may try again after this error.
    ///
    /// Transport, provider and decode failures are retried up to the
    /// configured bound; validation and internal errors surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Provider | ErrorCategory::Decode
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ProviderError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
