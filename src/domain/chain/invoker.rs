//! Single-attempt invocation: one outbound call raced against a timeout

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::time::timeout;

use super::{AttemptFailure, AttemptOutcome, FailureKind, ProviderSpec};
use crate::domain::DomainError;

/// The external capability a chain drives: send a request to one provider
#[async_trait]
pub trait ProviderTransport: Send + Sync + Debug {
    type Request: Send + Sync;
    type Payload: Send;

    async fn send(
        &self,
        provider: &ProviderSpec,
        request: &Self::Request,
    ) -> Result<Self::Payload, DomainError>;
}

/// Success predicate and output extraction in one step.
/// Returning `None` rejects the payload.
pub trait OutputExtractor<P>: Send + Sync + Debug {
    type Output: Send;

    fn extract(&self, payload: P) -> Option<Self::Output>;
}

/// Performs exactly one call and classifies it. Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderInvoker;

impl ProviderInvoker {
    pub async fn invoke<T, E>(
        transport: &T,
        extractor: &E,
        provider: &ProviderSpec,
        request: &T::Request,
        attempt: u32,
    ) -> AttemptOutcome<E::Output>
    where
        T: ProviderTransport + ?Sized,
        E: OutputExtractor<T::Payload> + ?Sized,
    {
        let label = provider.label();

        // Dropping the future on timeout abandons the call; the remote side may still finish.
        match timeout(provider.timeout(), transport.send(provider, request)).await {
            Err(_) => AttemptOutcome::Failure(AttemptFailure::new(
                FailureKind::Timeout,
                format!("no response within {}ms", provider.timeout().as_millis()),
                label,
                attempt,
            )),
            Ok(Err(DomainError::Timeout { timeout_ms, .. })) => {
                AttemptOutcome::Failure(AttemptFailure::new(
                    FailureKind::Timeout,
                    format!("no response within {}ms", timeout_ms),
                    label,
                    attempt,
                ))
            }
            Ok(Err(e)) => AttemptOutcome::Failure(AttemptFailure::new(
                FailureKind::TransportError,
                e.to_string(),
                label,
                attempt,
            )),
            Ok(Ok(payload)) => match extractor.extract(payload) {
                Some(output) => AttemptOutcome::Success {
                    output,
                    provider: label,
                },
                None => AttemptOutcome::Failure(AttemptFailure::new(
                    FailureKind::EmptyResponse,
                    "response did not contain usable output",
                    label,
                    attempt,
                )),
            },
        }
    }
}
