//! Wire → domain mapping
//!
//! Pure functions; none of them perform I/O or panic on missing fields.

use tracing::warn;

use crate::error::{LlmError, Result};
use crate::types::{
    CompletionResponse, Embedding, EmbeddingResponse, FinishReason, Response, Usage, UsageInfo,
};

/// Map provider usage, recomputing the total if the provider's does not add up.
pub fn usage_from(usage: &UsageInfo) -> Usage {
    let input = usage.prompt_tokens;
    let output = usage.completion_tokens.unwrap_or(0);
    let mapped = Usage {
        input_tokens: input,
        output_tokens: output,
        total_tokens: usage.total_tokens,
    };
    if mapped.is_consistent() {
        mapped
    } else if input.checked_add(output).is_none() {
        warn!(
            input_tokens = input,
            output_tokens = output,
            "provider usage overflows u32, saturating total"
        );
        Usage::new(input, output)
    } else {
        warn!(
            input_tokens = input,
            output_tokens = output,
            reported_total = usage.total_tokens,
            "provider usage total does not match input + output, recomputing"
        );
        Usage::new(input, output)
    }
}

pub fn finish_reason_from(raw: Option<&str>) -> Option<FinishReason> {
    raw.map(FinishReason::from_wire)
}

/// Build a text `Response` from the first choice of a completion body.
pub fn text_response_from(response: &CompletionResponse) -> Result<Response<String>> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| LlmError::DecodeError("response contained no choices".to_string()))?;
    let content = choice
        .message
        .as_ref()
        .and_then(|m| m.content.clone())
        .unwrap_or_default();

    Ok(Response::new(content)
        .with_usage(response.usage.as_ref().map(usage_from))
        .with_finish_reason(finish_reason_from(choice.finish_reason.as_deref())))
}

/// Build an embeddings `Response`, ordered by each item's `index`.
pub fn embedding_response_from(response: EmbeddingResponse) -> Response<Vec<Embedding>> {
    let usage = response.usage.as_ref().map(usage_from);
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    let embeddings = data
        .into_iter()
        .map(|d| Embedding::from(d.embedding))
        .collect();
    Response::new(embeddings).with_usage(usage)
}

/// What one decoded stream chunk contributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamFrame {
    pub delta: Option<String>,
    pub usage: Option<Usage>,
    pub finish_reason: Option<FinishReason>,
}

pub fn stream_frame_from(chunk: &CompletionResponse) -> StreamFrame {
    let first = chunk.choices.first();
    StreamFrame {
        delta: first
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.clone())
            .filter(|s| !s.is_empty()),
        usage: chunk.usage.as_ref().map(usage_from),
        finish_reason: finish_reason_from(first.and_then(|c| c.finish_reason.as_deref())),
    }
}
