//! Attempt and chain results

use std::fmt;

use serde::Serialize;

use crate::domain::DomainError;

/// Why a single attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider did not answer within the per-attempt timeout
    Timeout,
    /// Network failure or non-2xx status
    TransportError,
    /// The call completed but the success predicate rejected the payload
    EmptyResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::TransportError => write!(f, "transport_error"),
            Self::EmptyResponse => write!(f, "empty_response"),
        }
    }
}

/// Diagnostic record of one failed attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub kind: FailureKind,
    pub message: String,
    pub provider: String,
    /// 1-based attempt number against `provider`
    pub attempt: u32,
}

impl AttemptFailure {
    pub fn new(
        kind: FailureKind,
        message: impl Into<String>,
        provider: impl Into<String>,
        attempt: u32,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            attempt,
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempt {}: {} ({})",
            self.provider, self.attempt, self.kind, self.message
        )
    }
}

/// Tagged result of one invocation, consumed immediately by the chain
#[derive(Debug)]
pub enum AttemptOutcome<O> {
    Success { output: O, provider: String },
    Failure(AttemptFailure),
}

/// Terminal result of a chain execution
#[derive(Debug)]
pub enum ChainResult<O> {
    Success {
        output: O,
        provider_used: String,
        attempts_made: u32,
    },
    /// Every provider used all of its attempts; failures are in chronological order
    Exhausted { failures: Vec<AttemptFailure> },
}

/// Successful chain output detached from the result enum
#[derive(Debug, Clone)]
pub struct ChainSuccess<O> {
    pub output: O,
    pub provider_used: String,
    pub attempts_made: u32,
}

impl<O> ChainResult<O> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            Self::Success { .. } => &[],
            Self::Exhausted { failures } => failures,
        }
    }

    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        self.failures().last()
    }

    /// Converts `Exhausted` into `DomainError::Exhausted` for callers that treat it as an error
    pub fn into_result(self, chain: &str) -> Result<ChainSuccess<O>, DomainError> {
        match self {
            Self::Success {
                output,
                provider_used,
                attempts_made,
            } => Ok(ChainSuccess {
                output,
                provider_used,
                attempts_made,
            }),
            Self::Exhausted { failures } => {
                let last = failures
                    .last()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "no attempts were made".to_string());
                Err(DomainError::exhausted(chain, failures.len(), last))
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(O) -> U) -> ChainResult<U> {
        match self {
            Self::Success {
                output,
                provider_used,
                attempts_made,
            } => ChainResult::Success {
                output: f(output),
                provider_used,
                attempts_made,
            },
            Self::Exhausted { failures } => ChainResult::Exhausted { failures },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_into_result_summarizes_last_failure() {
        let result: ChainResult<String> = ChainResult::Exhausted {
            failures: vec![
                AttemptFailure::new(FailureKind::Timeout, "timed out", "groq/a", 1),
                AttemptFailure::new(FailureKind::TransportError, "HTTP 503", "groq/b", 1),
            ],
        };

        assert_eq!(result.last_failure().unwrap().provider, "groq/b");

        let err = result.into_result("text_generation").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("after 2 attempts"));
        assert!(message.contains("groq/b attempt 1: transport_error (HTTP 503)"));
    }

    #[test]
    fn test_success_into_result() {
        let result = ChainResult::Success {
            output: "idea".to_string(),
            provider_used: "groq/a".to_string(),
            attempts_made: 2,
        };

        assert!(result.is_success());
        assert!(result.failures().is_empty());

        let success = result.into_result("text_generation").unwrap();
        assert_eq!(success.output, "idea");
        assert_eq!(success.attempts_made, 2);
    }

    #[test]
    fn test_failure_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&FailureKind::EmptyResponse).unwrap(),
            "\"empty_response\""
        );
    }
}
