//! HTTP transport abstraction
//!
//! The client never talks to `reqwest` directly; it hands fully-built
//! requests to an [`HttpTransport`]. [`ReqwestTransport`] is the production
//! implementation. Tests and embedding applications can supply their own
//! to observe requests or return scripted responses.
//!
//! Transports only report network-level failures. Status handling
//! (non-2xx classification, retries) stays in the client.

mod headers;
mod reqwest_transport;

pub use headers::*;
pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::header::HeaderMap;
use std::pin::Pin;

use crate::error::LlmError;

/// Request metadata carried alongside each transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestContext {
    /// Unique id for log correlation
    pub request_id: String,
    /// API path, e.g. `fim/completions`
    pub operation: String,
    /// 1-based attempt number for blocking calls
    pub attempt: u32,
    pub stream: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub ctx: HttpRequestContext,
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

/// Transport-level response for a fully-read body.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpTransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Streaming response body.
pub struct HttpTransportStreamBody {
    inner: ByteStream,
}

impl HttpTransportStreamBody {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Single-chunk body, handy for scripted transports.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(futures_util::stream::once(async move { Ok(bytes) }))
    }

    pub fn into_stream(self) -> ByteStream {
        self.inner
    }
}

impl std::fmt::Debug for HttpTransportStreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HttpTransportStreamBody { .. }")
    }
}

/// Transport-level response whose body is consumed incrementally.
#[derive(Debug)]
pub struct HttpTransportStreamResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: HttpTransportStreamBody,
}

/// Pluggable HTTP transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and read the whole body.
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError>;

    /// Send the request and return as soon as headers arrive.
    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError>;
}
