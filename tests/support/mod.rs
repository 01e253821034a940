//! Shared helpers for integration tests.
#![allow(dead_code)]

pub mod scripted_transport;
pub mod stream_fixture;

use mistralai::{ClientConfig, RetryPolicy};

pub const TEST_API_KEY: &str = "test-api-key";

/// Config for scripted transports: immediate retries, no real host.
pub fn scripted_config(max_retries: u32) -> ClientConfig {
    ClientConfig::new(TEST_API_KEY)
        .with_base_url("http://scripted.invalid/v1")
        .with_retry_policy(RetryPolicy::immediate(max_retries))
}
