//! Error Handling Module
//!
//! - Core error type (`LlmError`) and its coarse `ErrorCategory`
//! - HTTP failure classification for Mistral error bodies
//! - Conversions from `reqwest` and `serde_json` errors
//!
//! # Example
//!
//! ```rust
//! use mistralai::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::provider_error(503, "Service unavailable");
//! assert_eq!(error.category(), ErrorCategory::Provider);
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
