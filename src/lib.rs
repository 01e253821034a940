//! # mistralai - Mistral AI API client
//!
//! Async Rust binding for the Mistral AI HTTP API: fill-in-the-middle code
//! completion, chat completion, embeddings and model listing, each in a
//! blocking (single awaited result) and, where the API supports it, a
//! streaming form.
//!
#![deny(unsafe_code)]

//! ## Quick Start
//!
//! ```rust,no_run
//! use mistralai::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MistralClient::new(ClientConfig::new("your-api-key"))?;
//!
//!     let model = CompletionModel::new(client.clone());
//!     let response = model.generate_with_suffix("def add(a, b):", "").await?;
//!     println!("{}", response.content);
//!
//!     let mut handler = StreamCallbacks::new(|token| print!("{token}"))
//!         .on_error(|e| eprintln!("stream failed: {e}"));
//!     StreamingCompletionModel::new(client)
//!         .generate("fn fib(n: u64) -> u64 {", &mut handler)
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! ## Retries and streaming
//!
//! Blocking calls are retried on transport, provider and decode failures,
//! up to `max_retries + 1` attempts in total (see [`RetryPolicy`]). Invalid
//! requests fail before anything is sent. Streaming calls are never retried;
//! their handler receives every token in arrival order and then exactly one
//! of `on_complete` / `on_error`.

pub mod client;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod retry;
pub mod streaming;
pub mod transport;
pub mod types;

pub use client::MistralClient;
pub use config::ClientConfig;
pub use error::{ErrorCategory, LlmError, Result};
pub use models::{ChatModel, CompletionModel, EmbeddingModel, FimParameters, StreamingCompletionModel};
pub use retry::{RetryExecutor, RetryPolicy};
pub use streaming::{
    CancelHandle, CompletionStream, StreamCallbacks, StreamEvent, StreamState,
    StreamingResponseHandler,
};
pub use types::{
    ChatMessage, ChatModelName, ChatRequest, CodeModel, Embedding, EmbeddingModelName,
    EmbeddingRequest, FimRequest, FinishReason, Response, ResponseFormat, Role, Usage,
};

/// Common imports.
pub mod prelude {
    pub use crate::client::MistralClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::models::*;
    pub use crate::retry::RetryPolicy;
    pub use crate::streaming::{
        CancelHandle, StreamCallbacks, StreamEvent, StreamState, StreamingResponseHandler,
    };
    pub use crate::types::{
        ChatMessage, ChatModelName, ChatRequest, CodeModel, Embedding, EmbeddingModelName,
        EmbeddingRequest, FimRequest, FinishReason, Response, ResponseFormat, Role, Usage,
    };
}
