//! Error helpers
//!
//! Turns a failed HTTP exchange into a `ProviderError` carrying the message
//! Mistral put in the body, plus request identifiers for debugging.

use reqwest::header::HeaderMap;
use serde_json::Value;

use super::types::LlmError;

const REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "x-kong-request-id", "traceparent"];

/// Classify a non-2xx response into a [`LlmError::ProviderError`].
///
/// Mistral reports errors in a few shapes:
/// `{"object":"error","message":"...","type":"..."}`, `{"detail":"..."}`,
/// `{"message":{"detail":[...]}}` for validation failures, and occasionally
/// an OpenAI-style `{"error":{"message":"..."}}`. Anything else falls back to
/// the canonical reason phrase or a sample of the raw body.
pub fn classify_http_error(status: u16, body_text: &str, headers: &HeaderMap) -> LlmError {
    let request_ids: Vec<String> = REQUEST_ID_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{name}={v}"))
        })
        .collect();

    let parsed = serde_json::from_str::<Value>(body_text).ok();
    let message = parsed
        .as_ref()
        .and_then(extract_message)
        .or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.chars().take(200).collect());

    let details = match parsed {
        Some(json) => serde_json::json!({
            "status": status,
            "response": json,
            "request_ids": request_ids,
        }),
        None => serde_json::json!({
            "status": status,
            "raw": body_text,
            "request_ids": request_ids,
        }),
    };

    LlmError::ProviderError {
        status,
        message,
        details: Some(details),
    }
}

fn extract_message(body: &Value) -> Option<String> {
    let candidate = body
        .get("message")
        .or_else(|| body.get("detail"))
        .or_else(|| body.pointer("/error/message"))?;
    match candidate {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn extracts_mistral_error_message() {
        let body = r#"{"object":"error","message":"Unauthorized","type":"invalid_request_error","param":null,"code":null}"#;
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-42"));

        match classify_http_error(401, body, &headers) {
            LlmError::ProviderError {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
                let details = details.expect("details");
                assert_eq!(details["request_ids"][0], "x-request-id=req-42");
                assert_eq!(details["response"]["type"], "invalid_request_error");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn structured_validation_message_is_stringified() {
        let body = r#"{"object":"error","message":{"detail":[{"loc":["body","prompt"],"msg":"field required"}]},"type":"invalid_request_message_error"}"#;
        let err = classify_http_error(422, body, &HeaderMap::new());
        let LlmError::ProviderError { message, .. } = err else {
            panic!("expected provider error");
        };
        assert!(message.contains("field required"));
    }

    #[test]
    fn falls_back_to_reason_phrase_for_non_json_body() {
        let err = classify_http_error(502, "<html>bad gateway</html>", &HeaderMap::new());
        match err {
            LlmError::ProviderError {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
                assert_eq!(details.expect("details")["raw"], "<html>bad gateway</html>");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
