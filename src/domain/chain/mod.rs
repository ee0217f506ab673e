//! Resilient provider chain - ordered fallback with bounded retries

mod backoff;
mod entity;
mod executor;
mod invoker;
mod outcome;

pub use backoff::BackoffPolicy;
pub use entity::{ChainRequest, DEFAULT_TIMEOUT_MS, ProviderSpec, RetryPolicy};
pub use executor::FallbackChain;
pub use invoker::{OutputExtractor, ProviderInvoker, ProviderTransport};
pub use outcome::{AttemptFailure, AttemptOutcome, ChainResult, ChainSuccess, FailureKind};
