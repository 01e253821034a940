use super::types::LlmError;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::TimeoutError(err.to_string())
        } else if err.is_connect() || err.is_request() {
            LlmError::ConnectionError(err.to_string())
        } else if err.is_decode() {
            LlmError::DecodeError(err.to_string())
        } else if let Some(status) = err.status() {
            LlmError::provider_error(status.as_u16(), err.to_string())
        } else if err.is_builder() {
            LlmError::InternalError(format!("failed to build request: {err}"))
        } else {
            LlmError::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::DecodeError(err.to_string())
    }
}
