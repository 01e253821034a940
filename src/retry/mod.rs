//! Retry module
//! - policy.rs: bounded retries with exponential backoff and jitter

pub mod policy;

pub use policy::*;
