use crate::client::MistralClient;
use crate::error::{LlmError, Result};
use crate::types::{Embedding, EmbeddingModelName, EmbeddingRequest, Response};

/// Text embeddings (`mistral-embed` by default).
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    client: MistralClient,
    model: EmbeddingModelName,
}

impl EmbeddingModel {
    pub fn new(client: MistralClient) -> Self {
        Self {
            client,
            model: EmbeddingModelName::default(),
        }
    }

    pub fn with_model(mut self, model: EmbeddingModelName) -> Self {
        self.model = model;
        self
    }

    /// One embedding per input, in input order.
    pub async fn embed_all<I, S>(&self, texts: I) -> Result<Response<Vec<Embedding>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = EmbeddingRequest::new(texts).with_model(self.model);
        self.client.embeddings(&request).await
    }

    pub async fn embed(&self, text: &str) -> Result<Response<Embedding>> {
        let response = self.embed_all([text]).await?;
        let Response {
            content,
            usage,
            finish_reason,
        } = response;
        let embedding = content
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::DecodeError("response contained no embeddings".into()))?;
        Ok(Response::new(embedding)
            .with_usage(usage)
            .with_finish_reason(finish_reason))
    }
}
