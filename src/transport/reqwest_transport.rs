use async_trait::async_trait;
use futures_util::StreamExt;

use super::{
    HttpMethod, HttpTransport, HttpTransportRequest, HttpTransportResponse,
    HttpTransportStreamBody, HttpTransportStreamResponse,
};
use crate::config::ClientConfig;
use crate::error::LlmError;

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the timeouts from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LlmError::InternalError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Reuse an existing `reqwest::Client` (and its connection pool).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(&self, request: HttpTransportRequest) -> Result<reqwest::Response, LlmError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        }
        .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(HttpTransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlmError::StreamError(format!("Stream error: {e}"))));
        Ok(HttpTransportStreamResponse {
            status,
            headers,
            body: HttpTransportStreamBody::from_stream(body),
        })
    }
}
