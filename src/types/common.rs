//! Provider-neutral result vocabulary: token usage, finish reasons and the
//! `Response<T>` wrapper returned by every blocking call.

use serde::{Deserialize, Serialize};

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt (and suffix, for FIM).
    pub input_tokens: u32,
    /// Tokens generated by the model.
    pub output_tokens: u32,
    /// `input_tokens + output_tokens`, saturating at `u32::MAX`.
    pub total_tokens: u32,
}

impl Usage {
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }

    /// Whether the total matches the sum of its parts. A sum that does not
    /// fit in `u32` is never consistent.
    pub const fn is_consistent(&self) -> bool {
        match self.input_tokens.checked_add(self.output_tokens) {
            Some(sum) => self.total_tokens == sum,
            None => false,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// Natural end of output or a stop sequence was hit.
    Stop,
    /// `max_tokens` or the model's context length was reached.
    Length,
    /// The model asked for tool calls.
    ToolExecution,
    /// Output was blocked by moderation.
    ContentFilter,
    /// Generation failed on the provider side.
    Error,
    /// A wire value this crate does not know about. Holds the raw value.
    Other(String),
}

impl FinishReason {
    /// Map a wire value onto the closed enumeration. Never fails.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "stop" => Self::Stop,
            "length" | "model_length" => Self::Length,
            "tool_calls" => Self::ToolExecution,
            "content_filter" => Self::ContentFilter,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolExecution => "tool_calls",
            Self::ContentFilter => "content_filter",
            Self::Error => "error",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One embedding vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Embedding {
    vector: Vec<f32>,
}

impl Embedding {
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.vector
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

/// Result of a blocking call: generated content plus accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub content: T,
    pub usage: Option<Usage>,
    pub finish_reason: Option<FinishReason>,
}

impl<T> Response<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            usage: None,
            finish_reason: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<Usage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: Option<FinishReason>) -> Self {
        self.finish_reason = finish_reason;
        self
    }

    pub fn content(&self) -> &T {
        &self.content
    }
}
