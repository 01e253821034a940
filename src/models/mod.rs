//! Model facades
//!
//! Thin wrappers over [`MistralClient`](crate::MistralClient) that hold
//! default parameters and build one request per call.

mod chat;
mod completion;
mod embedding;

pub use chat::ChatModel;
pub use completion::{CompletionModel, FimParameters, StreamingCompletionModel};
pub use embedding::EmbeddingModel;
