//! Client configuration
//!
//! `ClientConfig` is built once by the composing application and moved into
//! [`MistralClient`](crate::MistralClient). It can also be deserialized from
//! the host application's own config file (durations in seconds).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::retry::RetryPolicy;

/// Default values
pub mod defaults {
    use std::time::Duration;

    pub const BASE_URL: &str = "https://api.mistral.ai/v1";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const MAX_RETRIES: u32 = 3;
    pub const USER_AGENT: &str = concat!("mistralai-rust/", env!("CARGO_PKG_VERSION"));

    pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";
    pub const LEGACY_API_KEY_ENV: &str = "MISTRAL_AI_API_KEY";
    pub const BASE_URL_ENV: &str = "MISTRAL_BASE_URL";
}

/// Connection and behaviour settings for one client.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.mistral.ai/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer credential
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,
    /// Per-request timeout (connect + read)
    #[serde(default = "default_timeout", with = "duration_secs_serde")]
    pub timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_secs_serde")]
    pub connect_timeout: Duration,
    /// Retry policy for blocking calls. Streaming calls never retry.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Log serialized request bodies at debug level
    #[serde(default)]
    pub log_requests: bool,
    /// Log response bodies and stream frames at debug level
    #[serde(default)]
    pub log_responses: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    defaults::BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    defaults::REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    defaults::CONNECT_TIMEOUT
}

fn default_user_agent() -> String {
    defaults::USER_AGENT.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl ClientConfig {
    /// Configuration with defaults and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: SecretString::from(api_key.into()),
            timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            retry: RetryPolicy::default().with_max_retries(defaults::MAX_RETRIES),
            log_requests: false,
            log_responses: false,
            user_agent: default_user_agent(),
        }
    }

    /// Read the API key (and optionally the base URL) from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(defaults::API_KEY_ENV)
            .or_else(|_| std::env::var(defaults::LEGACY_API_KEY_ENV))
            .map_err(|_| {
                LlmError::validation(format!(
                    "{} is not set",
                    defaults::API_KEY_ENV
                ))
            })?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(defaults::BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Shorthand for adjusting only the retry bound.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry = self.retry.with_max_retries(max_retries);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn with_log_responses(mut self, enabled: bool) -> Self {
        self.log_responses = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fail fast on settings that can never produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::validation(
                "Mistral AI API key must be defined. It can be generated at https://console.mistral.ai/api-keys",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(LlmError::validation("Base URL cannot be blank"));
        }
        if self.timeout.is_zero() {
            return Err(LlmError::validation("Timeout must be greater than zero"));
        }
        self.retry.validate()
    }

    /// Absolute URL for an API path such as `fim/completions`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .field("log_requests", &self.log_requests)
            .field("log_responses", &self.log_responses)
            .finish()
    }
}

// Helper modules for Duration serialization
pub(crate) mod duration_secs_serde {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

pub(crate) mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
