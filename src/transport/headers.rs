use reqwest::header::{
    ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT,
};
use secrecy::ExposeSecret;

use crate::config::ClientConfig;
use crate::error::LlmError;

/// Headers sent with every request.
pub fn build_headers(config: &ClientConfig) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
        .map_err(|e| LlmError::validation(format!("Invalid API key format: {e}")))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|e| LlmError::validation(format!("Invalid user agent: {e}")))?;
    headers.insert(USER_AGENT, agent);

    Ok(headers)
}

/// Adjust base headers for an SSE response.
pub fn with_stream_headers(mut headers: HeaderMap) -> HeaderMap {
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_bearer_token_and_json_content_type() {
        let headers = build_headers(&ClientConfig::new("test-key")).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer test-key");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn stream_headers_accept_event_stream() {
        let headers = with_stream_headers(build_headers(&ClientConfig::new("k")).unwrap());
        assert_eq!(headers[ACCEPT], "text/event-stream");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
    }

    #[test]
    fn control_characters_in_key_are_rejected() {
        let err = build_headers(&ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, LlmError::ValidationError(_)));
    }
}
