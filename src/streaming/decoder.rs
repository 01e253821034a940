//! Completion chunk decoding
//!
//! Mistral streams one JSON `chat.completion.chunk` object per SSE `data:`
//! payload and closes with `data: [DONE]`.

use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use tracing::debug;

use super::sse::SseStreamExt;
use crate::error::LlmError;
use crate::types::CompletionResponse;

/// SSE payload that marks the end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// One decoded SSE payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SseFrame {
    Chunk(CompletionResponse),
    Done,
}

pub type FrameStream = Pin<Box<dyn Stream<Item = Result<SseFrame, LlmError>> + Send>>;

/// Decode a raw byte stream into completion frames.
///
/// The returned stream ends after the first error.
pub fn decode_frames<S>(byte_stream: S, log_frames: bool) -> FrameStream
where
    S: SseStreamExt,
{
    let mut events = byte_stream.into_sse_stream();

    let out = async_stream::stream! {
        while let Some(item) = events.next().await {
            let event = match item {
                Ok(ev) => ev,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let data = event.data.trim();
            if data.is_empty() {
                continue;
            }
            if log_frames {
                debug!(frame = data, "stream frame");
            }
            if data == DONE_MARKER {
                yield Ok(SseFrame::Done);
                continue;
            }

            match parse_chunk(data) {
                Ok(chunk) => yield Ok(SseFrame::Chunk(chunk)),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    };

    Box::pin(out)
}

fn parse_chunk(data: &str) -> Result<CompletionResponse, LlmError> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| LlmError::DecodeError(format!("Failed to parse stream chunk: {e}")))?;

    if value.get("object").and_then(|o| o.as_str()) == Some("error") {
        let message = value
            .get("message")
            .map(|m| match m {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(LlmError::StreamError(format!(
            "provider reported an error mid-stream: {message}"
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| LlmError::DecodeError(format!("Unexpected stream chunk shape: {e}")))
}
