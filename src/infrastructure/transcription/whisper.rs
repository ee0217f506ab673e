use async_trait::async_trait;
use serde_json::Value;

use crate::domain::chain::{ProviderSpec, ProviderTransport};
use crate::domain::{DomainError, TranscriptionRequest};
use crate::infrastructure::http_client::{FilePart, HttpClientTrait, MultipartBody};

/// OpenAI-compatible `/audio/transcriptions` transport
#[derive(Debug)]
pub struct WhisperTransport<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> WhisperTransport<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    fn transcriptions_url(provider: &ProviderSpec) -> String {
        format!("{}/audio/transcriptions", provider.endpoint())
    }
}

/// JSON bodies are parsed; anything else is kept as a string payload
fn decode_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl<C: HttpClientTrait> ProviderTransport for WhisperTransport<C> {
    type Request = TranscriptionRequest;
    type Payload = Value;

    async fn send(
        &self,
        provider: &ProviderSpec,
        request: &TranscriptionRequest,
    ) -> Result<Value, DomainError> {
        let auth_header = provider.api_key().map(|key| format!("Bearer {}", key));
        let headers = auth_header
            .as_deref()
            .map(|auth| vec![("Authorization", auth)])
            .unwrap_or_default();

        let body = MultipartBody {
            fields: vec![
                ("model".to_string(), provider.model().to_string()),
                ("response_format".to_string(), "json".to_string()),
            ],
            file: FilePart {
                field: "file".to_string(),
                file_name: request.file_name.clone(),
                content_type: request.content_type.clone(),
                bytes: request.audio.clone(),
            },
        };

        let response = self
            .client
            .post_multipart(&Self::transcriptions_url(provider), headers, body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => {
                    DomainError::provider(provider.label(), message)
                }
                other => other,
            })?;

        Ok(decode_body(&response.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ChainRequest, ChainResult, RetryPolicy};
    use crate::domain::transcription::TranscriptionChain;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use bytes::Bytes;
    use serde_json::json;

    const URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

    fn whisper(model: &str) -> ProviderSpec {
        ProviderSpec::new("groq", "https://api.groq.com/openai/v1", model).with_api_key("gsk")
    }

    fn clip() -> TranscriptionRequest {
        TranscriptionRequest::new(Bytes::from_static(b"RIFF"), "clip.wav", "audio/wav")
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(br#"{"text":"salut"}"#), json!({"text": "salut"}));
        assert_eq!(decode_body(b"salut"), json!("salut"));
    }

    #[tokio::test]
    async fn test_sends_model_and_response_format() {
        let transport = WhisperTransport::new(MockHttpClient::new().with_bytes(
            URL,
            br#"{"text":"salut"}"#,
            Some("application/json"),
        ));

        let payload = transport.send(&whisper("whisper-large-v3"), &clip()).await.unwrap();

        assert_eq!(payload["text"], "salut");
        let fields = &transport.client.requests()[0].fields;
        assert!(fields.contains(&("model".to_string(), "whisper-large-v3".to_string())));
        assert!(fields.contains(&("response_format".to_string(), "json".to_string())));
    }

    #[tokio::test]
    async fn test_transcript_field_is_extracted_through_chain() {
        let transport = WhisperTransport::new(MockHttpClient::new().with_bytes(
            URL,
            br#"{"transcript":"bonjour","duration":1.2}"#,
            None,
        ));
        let chain = TranscriptionChain::new(
            vec![whisper("whisper-large-v3-turbo")],
            RetryPolicy::single_attempt(),
            transport,
        )
        .unwrap();

        match chain.execute(&ChainRequest::new(clip())).await {
            ChainResult::Success { output, .. } => {
                assert!(output.is_parsed());
                assert_eq!(output.field(), Some("transcript"));
                assert_eq!(output.text(), "bonjour");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }
}
