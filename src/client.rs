//! Mistral AI API client
//!
//! One method per remote operation. Blocking calls run through the retry
//! executor; streaming calls make a single attempt.

use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{LlmError, Result, classify_http_error};
use crate::mapper::{embedding_response_from, text_response_from};
use crate::retry::RetryExecutor;
use crate::streaming::{
    CancelHandle, CompletionStream, StreamState, StreamingResponseHandler, completion_events,
    decode_frames, drive_stream,
};
use crate::transport::{
    HttpMethod, HttpRequestContext, HttpTransport, HttpTransportRequest, ReqwestTransport,
    build_headers, with_stream_headers,
};
use crate::types::{
    ChatRequest, CompletionResponse, Embedding, EmbeddingRequest, FimRequest, ModelList, Response,
};

const FIM_PATH: &str = "fim/completions";
const CHAT_PATH: &str = "chat/completions";
const EMBEDDINGS_PATH: &str = "embeddings";
const MODELS_PATH: &str = "models";

/// Client for the Mistral AI HTTP API.
///
/// Cheap to clone; clones share the transport and its connection pool.
///
/// ```rust,no_run
/// use mistralai::{ClientConfig, FimRequest, MistralClient};
///
/// # async fn run() -> mistralai::Result<()> {
/// let client = MistralClient::new(ClientConfig::from_env()?)?;
/// let request = FimRequest::builder("def add(a, b):").stop(["\n\n"]).build();
/// let response = client.fim_completion(&request).await?;
/// println!("{}", response.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MistralClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
    headers: HeaderMap,
    retry: RetryExecutor,
}

static_assertions::assert_impl_all!(MistralClient: Send, Sync, Clone);

impl MistralClient {
    /// Create a client backed by `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends every request through `transport`.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let headers = build_headers(&config)?;
        let retry = RetryExecutor::new(config.retry.clone());
        Ok(Self {
            config: Arc::new(config),
            transport,
            headers,
            retry,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// FIM completion with every choice the provider returned.
    pub async fn fim_completion_raw(&self, request: &FimRequest) -> Result<CompletionResponse> {
        request.validate()?;
        let body = to_body(&request.with_stream(false))?;
        self.call(HttpMethod::Post, FIM_PATH, Some(body), Ok).await
    }

    /// FIM completion mapped to the first choice.
    pub async fn fim_completion(&self, request: &FimRequest) -> Result<Response<String>> {
        request.validate()?;
        let body = to_body(&request.with_stream(false))?;
        self.call(HttpMethod::Post, FIM_PATH, Some(body), |raw: CompletionResponse| {
            text_response_from(&raw)
        })
        .await
    }

    /// Chat completion with every choice the provider returned.
    pub async fn chat_completion_raw(&self, request: &ChatRequest) -> Result<CompletionResponse> {
        request.validate()?;
        let body = to_body(&request.with_stream(false))?;
        self.call(HttpMethod::Post, CHAT_PATH, Some(body), Ok).await
    }

    /// Chat completion mapped to the first choice.
    pub async fn chat(&self, request: &ChatRequest) -> Result<Response<String>> {
        request.validate()?;
        let body = to_body(&request.with_stream(false))?;
        self.call(HttpMethod::Post, CHAT_PATH, Some(body), |raw: CompletionResponse| {
            text_response_from(&raw)
        })
        .await
    }

    pub async fn embeddings(&self, request: &EmbeddingRequest) -> Result<Response<Vec<Embedding>>> {
        request.validate()?;
        let body = to_body(request)?;
        self.call(HttpMethod::Post, EMBEDDINGS_PATH, Some(body), |raw| {
            Ok(embedding_response_from(raw))
        })
        .await
    }

    /// Models available to the configured key.
    pub async fn list_models(&self) -> Result<ModelList> {
        self.call(HttpMethod::Get, MODELS_PATH, None, Ok).await
    }

    /// Stream a FIM completion. Not retried.
    pub async fn fim_completion_stream(&self, request: &FimRequest) -> Result<CompletionStream> {
        request.validate()?;
        let body = to_body(&request.with_stream(true))?;
        self.open_stream(FIM_PATH, body).await
    }

    /// Stream a chat completion. Not retried.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<CompletionStream> {
        request.validate()?;
        let body = to_body(&request.with_stream(true))?;
        self.open_stream(CHAT_PATH, body).await
    }

    /// Stream a FIM completion into `handler`.
    ///
    /// Validation and connection failures are reported through
    /// `handler.on_error`. Returns the terminal state.
    pub async fn fim_completion_with_handler<H>(
        &self,
        request: &FimRequest,
        handler: &mut H,
        cancel: Option<&CancelHandle>,
    ) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        drive_stream(self.fim_completion_stream(request), handler, cancel).await
    }

    /// Stream a chat completion into `handler`.
    pub async fn chat_stream_with_handler<H>(
        &self,
        request: &ChatRequest,
        handler: &mut H,
        cancel: Option<&CancelHandle>,
    ) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        drive_stream(self.chat_stream(request), handler, cancel).await
    }

    /// Run one logical call with retries. Decoding and `map` run inside
    /// each attempt, so a malformed body is retried like a failed request.
    async fn call<W, R, M>(
        &self,
        method: HttpMethod,
        path: &'static str,
        body: Option<serde_json::Value>,
        map: M,
    ) -> Result<R>
    where
        W: DeserializeOwned,
        M: Fn(W) -> Result<R>,
    {
        let request_id = Uuid::new_v4().to_string();
        let url = self.config.endpoint(path);
        if self.config.log_requests {
            if let Some(body) = &body {
                debug!(request_id = %request_id, operation = path, body = %body, "request body");
            }
        }

        let this = self;
        let body = &body;
        let url = &url;
        let request_id = &request_id;
        let map = &map;
        self.retry
            .execute(move |attempt| {
                let request = HttpTransportRequest {
                    ctx: HttpRequestContext {
                        request_id: request_id.clone(),
                        operation: path.to_string(),
                        attempt,
                        stream: false,
                    },
                    method,
                    url: url.clone(),
                    headers: this.headers.clone(),
                    body: body.clone(),
                };
                let span = debug_span!(
                    "mistral.request",
                    request_id = %request_id,
                    operation = path,
                    attempt
                );
                async move {
                    let wire: W = this.execute_once(request).await?;
                    map(wire)
                }
                .instrument(span)
            })
            .await
    }

    async fn execute_once<W: DeserializeOwned>(&self, request: HttpTransportRequest) -> Result<W> {
        let response = self.transport.execute_json(request).await.inspect_err(|e| {
            debug!(error = %e, "transport failure");
        })?;

        let text = String::from_utf8_lossy(&response.body);
        if self.config.log_responses {
            debug!(status = response.status, body = %text, "response body");
        }
        if !response.is_success() {
            let error = classify_http_error(response.status, &text, &response.headers);
            debug!(status = response.status, error = %error, "provider returned an error");
            return Err(error);
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| LlmError::DecodeError(format!("Failed to parse response body: {e}")))
    }

    async fn open_stream(
        &self,
        path: &'static str,
        body: serde_json::Value,
    ) -> Result<CompletionStream> {
        let request_id = Uuid::new_v4().to_string();
        let span = debug_span!("mistral.stream", request_id = %request_id, operation = path);

        async {
            if self.config.log_requests {
                debug!(body = %body, "request body");
            }
            let request = HttpTransportRequest {
                ctx: HttpRequestContext {
                    request_id: request_id.clone(),
                    operation: path.to_string(),
                    attempt: 1,
                    stream: true,
                },
                method: HttpMethod::Post,
                url: self.config.endpoint(path),
                headers: with_stream_headers(self.headers.clone()),
                body: Some(body),
            };

            let response = self.transport.execute_stream(request).await?;
            if !(200..300).contains(&response.status) {
                let mut chunks = response.body.into_stream();
                let mut raw = Vec::new();
                while let Some(Ok(chunk)) = chunks.next().await {
                    raw.extend_from_slice(&chunk);
                }
                let text = String::from_utf8_lossy(&raw);
                if self.config.log_responses {
                    debug!(status = response.status, body = %text, "response body");
                }
                return Err(classify_http_error(response.status, &text, &response.headers));
            }

            debug!(status = response.status, "stream opened");
            let frames = decode_frames(response.body.into_stream(), self.config.log_responses);
            Ok(completion_events(frames))
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &"[REDACTED]")
            .field("max_retries", &self.retry.policy().max_retries)
            .finish()
    }
}

fn to_body<T: Serialize>(request: &T) -> Result<serde_json::Value> {
    serde_json::to_value(request)
        .map_err(|e| LlmError::InternalError(format!("Failed to serialize request: {e}")))
}
