use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Timed out after {timeout_ms}ms: {provider}")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Chain '{chain}' exhausted after {attempts} attempts; last failure: {last}")]
    Exhausted {
        chain: String,
        attempts: usize,
        last: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            timeout_ms,
        }
    }

    pub fn exhausted(chain: impl Into<String>, attempts: usize, last: impl Into<String>) -> Self {
        Self::Exhausted {
            chain: chain.into(),
            attempts,
            last: last.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_exhausted_error() {
        let error = DomainError::exhausted("text_generation", 3, "HTTP 503");
        assert_eq!(
            error.to_string(),
            "Chain 'text_generation' exhausted after 3 attempts; last failure: HTTP 503"
        );
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("playai", "HTTP 401");
        assert_eq!(error.to_string(), "Provider error: playai - HTTP 401");
    }
}
