//! Text generation chain - ordered language models with per-model retries

use async_trait::async_trait;
use serde_json::Value;

use super::GenerationRequest;
use crate::domain::chain::{
    ChainRequest, ChainResult, FallbackChain, OutputExtractor, ProviderSpec, ProviderTransport,
    RetryPolicy,
};
use crate::domain::DomainError;

pub const TEXT_GENERATION_CHAIN: &str = "text_generation";

/// Pulls generated text out of one response shape
pub type TextCandidate = fn(&Value) -> Option<&str>;

/// Known response shapes, tried in order. First non-blank match wins.
pub const TEXT_CANDIDATES: &[(&str, TextCandidate)] = &[
    ("chat_completion", chat_completion_content),
    ("completion", completion_text),
    ("responses", responses_output_text),
    ("text_generation", generated_text),
];

fn chat_completion_content(payload: &Value) -> Option<&str> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
}

fn completion_text(payload: &Value) -> Option<&str> {
    payload.pointer("/choices/0/text").and_then(Value::as_str)
}

fn responses_output_text(payload: &Value) -> Option<&str> {
    payload.get("output_text").and_then(Value::as_str)
}

fn generated_text(payload: &Value) -> Option<&str> {
    payload.pointer("/0/generated_text").and_then(Value::as_str)
}

/// Accepts a payload only if some candidate yields non-blank text
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedTextExtractor;

impl OutputExtractor<Value> for GeneratedTextExtractor {
    type Output = String;

    fn extract(&self, payload: Value) -> Option<String> {
        TEXT_CANDIDATES
            .iter()
            .filter_map(|(_, candidate)| candidate(&payload))
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &ChainRequest<GenerationRequest>) -> ChainResult<String>;
}

/// Fallback chain configured for language models
#[derive(Debug)]
pub struct TextGenerationChain<T> {
    chain: FallbackChain<T, GeneratedTextExtractor>,
}

impl<T> TextGenerationChain<T>
where
    T: ProviderTransport<Request = GenerationRequest, Payload = Value>,
{
    pub fn new(
        providers: Vec<ProviderSpec>,
        retry: RetryPolicy,
        transport: T,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            chain: FallbackChain::new(
                TEXT_GENERATION_CHAIN,
                providers,
                retry,
                transport,
                GeneratedTextExtractor,
            )?,
        })
    }

    pub fn inner(&self) -> &FallbackChain<T, GeneratedTextExtractor> {
        &self.chain
    }

    pub async fn execute(&self, request: &ChainRequest<GenerationRequest>) -> ChainResult<String> {
        self.chain.execute(request).await
    }
}

#[async_trait]
impl<T> TextGenerator for TextGenerationChain<T>
where
    T: ProviderTransport<Request = GenerationRequest, Payload = Value>,
{
    async fn generate(&self, request: &ChainRequest<GenerationRequest>) -> ChainResult<String> {
        self.execute(request).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{BackoffPolicy, FailureKind};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn test_extracts_chat_completion_content() {
        let payload = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Run at dawn.  "}}]
        });
        assert_eq!(
            GeneratedTextExtractor.extract(payload),
            Some("Run at dawn.".to_string())
        );
    }

    #[test]
    fn test_extracts_legacy_and_alternative_shapes() {
        assert_eq!(
            GeneratedTextExtractor.extract(json!({"choices": [{"text": "legacy"}]})),
            Some("legacy".to_string())
        );
        assert_eq!(
            GeneratedTextExtractor.extract(json!({"output_text": "responses api"})),
            Some("responses api".to_string())
        );
        assert_eq!(
            GeneratedTextExtractor.extract(json!([{"generated_text": "hf"}])),
            Some("hf".to_string())
        );
    }

    #[test]
    fn test_blank_content_falls_through_to_next_candidate() {
        let payload = json!({
            "choices": [{"message": {"content": "   "}}],
            "output_text": "second shape"
        });
        assert_eq!(
            GeneratedTextExtractor.extract(payload),
            Some("second shape".to_string())
        );
    }

    #[test]
    fn test_rejects_payload_without_text() {
        assert_eq!(GeneratedTextExtractor.extract(json!({"choices": []})), None);
        assert_eq!(
            GeneratedTextExtractor.extract(json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
        assert_eq!(GeneratedTextExtractor.extract(Value::Null), None);
    }

    #[derive(Debug, Default)]
    struct ModelTransport {
        responses: Mutex<HashMap<String, Vec<Value>>>,
    }

    #[async_trait]
    impl ProviderTransport for ModelTransport {
        type Request = GenerationRequest;
        type Payload = Value;

        async fn send(
            &self,
            provider: &ProviderSpec,
            _request: &GenerationRequest,
        ) -> Result<Value, DomainError> {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(provider.model()) {
                Some(queue) if !queue.is_empty() => Ok(queue.remove(0)),
                _ => Err(DomainError::provider(provider.name(), "HTTP 503: overloaded")),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_answers_then_fallback_model() {
        let transport = ModelTransport::default();
        transport.responses.lock().unwrap().insert(
            "llama-3.1-8b-instant".to_string(),
            vec![json!({"choices": [{"message": {"content": ""}}]})],
        );
        transport.responses.lock().unwrap().insert(
            "mixtral-8x7b".to_string(),
            vec![json!({"choices": [{"message": {"content": "Idea"}}]})],
        );

        let providers = vec![
            ProviderSpec::new("groq", "http://groq", "llama-3.1-8b-instant"),
            ProviderSpec::new("groq", "http://groq", "mixtral-8x7b"),
        ];
        let retry = RetryPolicy::new(2, BackoffPolicy::linear(1000, 1500)).unwrap();
        let chain = TextGenerationChain::new(providers, retry, transport).unwrap();

        let result = chain
            .execute(&ChainRequest::new(GenerationRequest::new("motivation")))
            .await;

        match result {
            ChainResult::Success {
                output,
                provider_used,
                attempts_made,
            } => {
                assert_eq!(output, "Idea");
                assert_eq!(provider_used, "groq/mixtral-8x7b");
                assert_eq!(attempts_made, 3);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_empty_and_transport_failures() {
        let transport = ModelTransport::default();
        transport.responses.lock().unwrap().insert(
            "m1".to_string(),
            vec![json!({"choices": [{"message": {"content": " "}}]})],
        );

        let chain = TextGenerationChain::new(
            vec![ProviderSpec::new("groq", "http://groq", "m1")],
            RetryPolicy::new(2, BackoffPolicy::None).unwrap(),
            transport,
        )
        .unwrap();

        let result = chain
            .execute(&ChainRequest::new(GenerationRequest::new("x")))
            .await;
        let kinds: Vec<FailureKind> = result.failures().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FailureKind::EmptyResponse, FailureKind::TransportError]);
    }
}
