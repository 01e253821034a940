use crate::client::MistralClient;
use crate::error::Result;
use crate::streaming::{CancelHandle, CompletionStream, StreamState, StreamingResponseHandler};
use crate::types::{CodeModel, FimRequest, Response};

/// Default sampling parameters shared by the FIM models.
#[derive(Debug, Clone, PartialEq)]
pub struct FimParameters {
    pub model: String,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub min_tokens: Option<u32>,
    pub random_seed: Option<u64>,
    pub stop: Vec<String>,
}

impl Default for FimParameters {
    fn default() -> Self {
        Self {
            model: CodeModel::default().into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            min_tokens: None,
            random_seed: None,
            stop: Vec::new(),
        }
    }
}

impl FimParameters {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
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

    pub fn with_min_tokens(mut self, min_tokens: u32) -> Self {
        self.min_tokens = Some(min_tokens);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    /// A fresh request for one call. `suffix` never outlives the call.
    pub fn request(&self, prompt: &str, suffix: Option<&str>) -> FimRequest {
        let mut builder = FimRequest::builder(prompt)
            .model(self.model.as_str())
            .stop(self.stop.iter().cloned());
        if let Some(suffix) = suffix {
            builder = builder.suffix(suffix);
        }
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(p) = self.top_p {
            builder = builder.top_p(p);
        }
        if let Some(n) = self.max_tokens {
            builder = builder.max_tokens(n);
        }
        if let Some(n) = self.min_tokens {
            builder = builder.min_tokens(n);
        }
        if let Some(seed) = self.random_seed {
            builder = builder.random_seed(seed);
        }
        builder.build()
    }
}

/// Blocking fill-in-the-middle code completion.
#[derive(Debug, Clone)]
pub struct CompletionModel {
    client: MistralClient,
    parameters: FimParameters,
}

impl CompletionModel {
    pub fn new(client: MistralClient) -> Self {
        Self {
            client,
            parameters: FimParameters::default(),
        }
    }

    pub fn with_model(mut self, model: CodeModel) -> Self {
        self.parameters.model = model.into();
        self
    }

    pub fn with_parameters(mut self, parameters: FimParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameters(&self) -> &FimParameters {
        &self.parameters
    }

    /// Complete `prompt` with no suffix.
    pub async fn generate(&self, prompt: &str) -> Result<Response<String>> {
        self.client
            .fim_completion(&self.parameters.request(prompt, None))
            .await
    }

    /// Fill the gap between `prompt` and `suffix`.
    pub async fn generate_with_suffix(
        &self,
        prompt: &str,
        suffix: &str,
    ) -> Result<Response<String>> {
        self.client
            .fim_completion(&self.parameters.request(prompt, Some(suffix)))
            .await
    }
}

/// Streaming fill-in-the-middle code completion.
///
/// Output is delivered to a [`StreamingResponseHandler`]: `on_next` per
/// token, then exactly one of `on_complete` / `on_error`.
#[derive(Debug, Clone)]
pub struct StreamingCompletionModel {
    client: MistralClient,
    parameters: FimParameters,
}

impl StreamingCompletionModel {
    pub fn new(client: MistralClient) -> Self {
        Self {
            client,
            parameters: FimParameters::default(),
        }
    }

    pub fn with_model(mut self, model: CodeModel) -> Self {
        self.parameters.model = model.into();
        self
    }

    pub fn with_parameters(mut self, parameters: FimParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn parameters(&self) -> &FimParameters {
        &self.parameters
    }

    pub async fn generate<H>(&self, prompt: &str, handler: &mut H) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        let request = self.parameters.request(prompt, None);
        self.client
            .fim_completion_with_handler(&request, handler, None)
            .await
    }

    pub async fn generate_with_suffix<H>(
        &self,
        prompt: &str,
        suffix: &str,
        handler: &mut H,
    ) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        let request = self.parameters.request(prompt, Some(suffix));
        self.client
            .fim_completion_with_handler(&request, handler, None)
            .await
    }

    /// Like [`generate_with_suffix`](Self::generate_with_suffix), stoppable
    /// through `cancel`. A cancelled call fires no terminal callback.
    pub async fn generate_cancellable<H>(
        &self,
        prompt: &str,
        suffix: Option<&str>,
        handler: &mut H,
        cancel: &CancelHandle,
    ) -> StreamState
    where
        H: StreamingResponseHandler + ?Sized,
    {
        let request = self.parameters.request(prompt, suffix);
        self.client
            .fim_completion_with_handler(&request, handler, Some(cancel))
            .await
    }

    /// Pull-based alternative to the handler methods.
    pub async fn stream(&self, prompt: &str, suffix: Option<&str>) -> Result<CompletionStream> {
        self.client
            .fim_completion_stream(&self.parameters.request(prompt, suffix))
            .await
    }
}
