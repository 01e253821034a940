use crate::client::MistralClient;
use crate::error::Result;
use crate::streaming::{CancelHandle, StreamState, StreamingResponseHandler};
use crate::types::{ChatMessage, ChatModelName, ChatRequest, ResponseFormat, Response};

/// Chat completion with fixed defaults.
#[derive(Debug, Clone)]
pub struct ChatModel {
    client: MistralClient,
    model: String,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    random_seed: Option<u64>,
    safe_prompt: bool,
    response_format: Option<ResponseFormat>,
}

impl ChatModel {
    pub fn new(client: MistralClient, model: ChatModelName) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            random_seed: None,
            safe_prompt: false,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_safe_prompt(mut self, safe_prompt: bool) -> Self {
        self.safe_prompt = safe_prompt;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, messages: &[ChatMessage]) -> ChatRequest {
        let mut builder = ChatRequest::builder(self.model.as_str())
            .messages(messages.iter().cloned())
            .safe_prompt(self.safe_prompt);
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(p) = self.top_p {
            builder = builder.top_p(p);
        }
        if let Some(n) = self.max_tokens {
            builder = builder.max_tokens(n);
        }
        if let Some(seed) = self.random_seed {
            builder = builder.random_seed(seed);
        }
        if let Some(format) = self.response_format {
            builder = builder.response_format(format);
        }
        builder.build()
    }

    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<Response<String>> {
        self.client.chat(&self.request(messages)).await
    }

    pub async fn generate_streaming<H>(
        &self,
        messages: &[ChatMessage],
        handler: &mut H,
        cancel: Option<&CancelHandle>,
    ) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        self.client
            .chat_stream_with_handler(&self.request(messages), handler, cancel)
            .await
    }
}
