//! Provider chain configuration and request types

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use super::BackoffPolicy;
use crate::domain::DomainError;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// One backend a chain may try. Built once from configuration, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    name: String,
    endpoint: String,
    model: String,
    timeout: Duration,
    api_key: Option<String>,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            api_key: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Identifier reported as `provider_used` / `provider_tried`
    pub fn label(&self) -> String {
        if self.model.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.model)
        }
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Attempts per provider and the delay between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: BackoffPolicy) -> Result<Self, DomainError> {
        if max_attempts == 0 {
            return Err(DomainError::validation(
                "Retry policy requires at least one attempt per provider",
            ));
        }

        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    /// One attempt per provider, no backoff
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffPolicy::None,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }
}

/// Domain input for one chain execution plus a correlation token for logs
#[derive(Debug, Clone)]
pub struct ChainRequest<R> {
    input: R,
    correlation_id: String,
}

impl<R> ChainRequest<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn input(&self) -> &R {
        &self.input
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
