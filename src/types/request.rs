//! Request types
//!
//! Every request is an immutable value: construct it through its builder,
//! hand it to the client, and reuse it as often as you like. The client
//! sets the `stream` flag on its own copy, so one request can drive both a
//! blocking and a streaming call.

use serde::{Deserialize, Serialize};

use super::models::{CodeModel, EmbeddingModelName};
use crate::error::{LlmError, Result};

/// Chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Output format constraint for chat completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Fill-in-the-middle completion request (`POST /fim/completions`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FimRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    random_seed: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    stream: bool,
}

impl FimRequest {
    /// Start a request for `prompt` against `codestral-latest`.
    pub fn builder(prompt: impl Into<String>) -> FimRequestBuilder {
        FimRequestBuilder::new(prompt)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn top_p(&self) -> Option<f64> {
        self.top_p
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn min_tokens(&self) -> Option<u32> {
        self.min_tokens
    }

    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    pub fn stop(&self) -> &[String] {
        &self.stop
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    /// Check the fields the API requires.
    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.prompt, "Prompt")?;
        ensure_not_blank(&self.model, "Model name")
    }

    pub(crate) fn with_stream(&self, stream: bool) -> Self {
        Self {
            stream,
            ..self.clone()
        }
    }
}

/// Builder for [`FimRequest`].
#[derive(Debug, Clone)]
pub struct FimRequestBuilder {
    inner: FimRequest,
}

impl FimRequestBuilder {
    fn new(prompt: impl Into<String>) -> Self {
        Self {
            inner: FimRequest {
                model: CodeModel::default().into(),
                prompt: prompt.into(),
                suffix: None,
                temperature: None,
                top_p: None,
                max_tokens: None,
                min_tokens: None,
                random_seed: None,
                stop: Vec::new(),
                stream: false,
            },
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.inner.model = model.into();
        self
    }

    /// Text that follows the gap to be filled.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.inner.suffix = Some(suffix.into());
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.inner.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.inner.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.inner.max_tokens = Some(max_tokens);
        self
    }

    pub fn min_tokens(mut self, min_tokens: u32) -> Self {
        self.inner.min_tokens = Some(min_tokens);
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.inner.random_seed = Some(seed);
        self
    }

    pub fn stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> FimRequest {
        self.inner
    }
}

/// Chat completion request (`POST /chat/completions`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    random_seed: Option<u64>,
    #[serde(skip_serializing_if = "is_false")]
    safe_prompt: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

impl ChatRequest {
    pub fn builder(model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder {
            inner: ChatRequest {
                model: model.into(),
                messages: Vec::new(),
                temperature: None,
                top_p: None,
                max_tokens: None,
                random_seed: None,
                safe_prompt: false,
                stop: Vec::new(),
                response_format: None,
                stream: false,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.model, "Model name")?;
        if self.messages.is_empty() {
            return Err(LlmError::validation("Messages cannot be empty"));
        }
        if let Some(last) = self.messages.last() {
            ensure_not_blank(&last.content, "Last message content")?;
        }
        Ok(())
    }

    pub(crate) fn with_stream(&self, stream: bool) -> Self {
        Self {
            stream,
            ..self.clone()
        }
    }
}

/// Builder for [`ChatRequest`].
#[derive(Debug, Clone)]
pub struct ChatRequestBuilder {
    inner: ChatRequest,
}

impl ChatRequestBuilder {
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.inner.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.inner.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.inner.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.inner.top_p = Some(top_p);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.inner.max_tokens = Some(max_tokens);
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.inner.random_seed = Some(seed);
        self
    }

    /// Ask the API to prepend its safety system prompt.
    pub fn safe_prompt(mut self, safe_prompt: bool) -> Self {
        self.inner.safe_prompt = safe_prompt;
        self
    }

    pub fn stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.inner.response_format = Some(format);
        self
    }

    pub fn build(self) -> ChatRequest {
        self.inner
    }
}

/// Embedding request (`POST /embeddings`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    encoding_format: String,
}

impl EmbeddingRequest {
    /// Embed `input` with `mistral-embed`.
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: EmbeddingModelName::default().into(),
            input: input.into_iter().map(Into::into).collect(),
            encoding_format: "float".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn input(&self) -> &[String] {
        &self.input
    }

    pub fn validate(&self) -> Result<()> {
        ensure_not_blank(&self.model, "Model name")?;
        if self.input.is_empty() {
            return Err(LlmError::validation("Embedding input cannot be empty"));
        }
        Ok(())
    }
}

pub(crate) fn ensure_not_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LlmError::validation(format!(
            "{name} cannot be null or blank"
        )))
    } else {
        Ok(())
    }
}
