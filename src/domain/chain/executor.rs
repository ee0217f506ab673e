//! Fallback chain executor - ordered providers with bounded retries and backoff

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::{
    AttemptOutcome, ChainRequest, ChainResult, OutputExtractor, ProviderInvoker, ProviderSpec,
    ProviderTransport, RetryPolicy,
};
use crate::domain::DomainError;

/// Tries each provider in declared order, retrying per the retry policy,
/// until one succeeds or all are exhausted.
///
/// Holds only immutable configuration; `execute` keeps its counters and
/// accumulated failures on the stack, so one chain can serve concurrent
/// requests and a failure on one request never affects the next.
#[derive(Debug)]
pub struct FallbackChain<T, E> {
    name: String,
    providers: Arc<[ProviderSpec]>,
    retry: RetryPolicy,
    transport: T,
    extractor: E,
}

impl<T, E> FallbackChain<T, E>
where
    T: ProviderTransport,
    E: OutputExtractor<T::Payload>,
{
    pub fn new(
        name: impl Into<String>,
        providers: Vec<ProviderSpec>,
        retry: RetryPolicy,
        transport: T,
        extractor: E,
    ) -> Result<Self, DomainError> {
        let name = name.into();

        if providers.is_empty() {
            return Err(DomainError::validation(format!(
                "Chain '{}' has no providers",
                name
            )));
        }

        Ok(Self {
            name,
            providers: providers.into(),
            retry,
            transport,
            extractor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn providers(&self) -> &[ProviderSpec] {
        &self.providers
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute the chain for one request
    pub async fn execute(&self, request: &ChainRequest<T::Request>) -> ChainResult<E::Output> {
        let start = Instant::now();
        let correlation_id = request.correlation_id();
        let max_attempts = self.retry.max_attempts();
        let mut failures = Vec::new();

        for provider in self.providers.iter() {
            for attempt in 1..=max_attempts {
                debug!(
                    chain = %self.name,
                    correlation_id = %correlation_id,
                    provider = %provider.label(),
                    attempt,
                    max_attempts,
                    "Trying provider"
                );

                let outcome = ProviderInvoker::invoke(
                    &self.transport,
                    &self.extractor,
                    provider,
                    request.input(),
                    attempt,
                )
                .await;

                match outcome {
                    AttemptOutcome::Success { output, provider } => {
                        let attempts_made = failures.len() as u32 + 1;

                        info!(
                            chain = %self.name,
                            correlation_id = %correlation_id,
                            provider = %provider,
                            attempts_made,
                            latency_ms = start.elapsed().as_millis() as u64,
                            "Chain succeeded"
                        );

                        return ChainResult::Success {
                            output,
                            provider_used: provider,
                            attempts_made,
                        };
                    }
                    AttemptOutcome::Failure(failure) => {
                        warn!(
                            chain = %self.name,
                            correlation_id = %correlation_id,
                            provider = %failure.provider,
                            attempt = failure.attempt,
                            kind = %failure.kind,
                            error = %failure.message,
                            "Provider attempt failed"
                        );
                        failures.push(failure);
                    }
                }

                if attempt < max_attempts {
                    let delay = self.retry.backoff().delay(attempt);
                    debug!(
                        chain = %self.name,
                        correlation_id = %correlation_id,
                        delay_ms = delay.as_millis() as u64,
                        "Backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            debug!(
                chain = %self.name,
                correlation_id = %correlation_id,
                provider = %provider.label(),
                "Provider exhausted, falling back"
            );
        }

        error!(
            chain = %self.name,
            correlation_id = %correlation_id,
            attempts = failures.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "All providers exhausted"
        );

        ChainResult::Exhausted { failures }
    }
}
