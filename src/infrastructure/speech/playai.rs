use async_trait::async_trait;
use serde_json::json;

use crate::domain::chain::ProviderSpec;
use crate::domain::speech::{RoutedSpeech, SpeechBackend, SynthesizedAudio};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Paid TTS endpoint taking `{text, voice}` and answering with raw audio
#[derive(Debug)]
pub struct PlayAiBackend<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> PlayAiBackend<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: HttpClientTrait> SpeechBackend for PlayAiBackend<C> {
    async fn synthesize(
        &self,
        provider: &ProviderSpec,
        speech: &RoutedSpeech,
    ) -> Result<SynthesizedAudio, DomainError> {
        let api_key = provider.api_key().ok_or_else(|| {
            DomainError::provider(provider.label(), "API key is not configured")
        })?;
        let auth_header = format!("Bearer {}", api_key);

        let body = self
            .client
            .post_json_for_bytes(
                provider.endpoint(),
                vec![("Authorization", auth_header.as_str())],
                &json!({"text": speech.text, "voice": speech.voice}),
            )
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => {
                    DomainError::provider(provider.label(), message)
                }
                other => other,
            })?;

        Ok(SynthesizedAudio::new(
            body.bytes,
            body.content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::VoiceRouting;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    fn playai() -> ProviderSpec {
        ProviderSpec::new("playai", "https://api.playai.com/tts", "").with_api_key("pk")
    }

    #[tokio::test]
    async fn test_posts_text_and_voice() {
        let backend = PlayAiBackend::new(MockHttpClient::new().with_bytes(
            "https://api.playai.com/tts",
            b"ID3audio",
            None,
        ));
        let speech = VoiceRouting::default().route("Bonjour", None);

        let audio = backend.synthesize(&playai(), &speech).await.unwrap();

        assert_eq!(audio.bytes.as_ref(), b"ID3audio");
        assert_eq!(audio.content_type, "audio/mpeg");

        let requests = backend.client.requests();
        assert_eq!(
            requests[0].json,
            Some(json!({"text": "Bonjour", "voice": "fr-FR"}))
        );
        assert!(requests[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer pk".to_string())));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_calling_out() {
        let backend = PlayAiBackend::new(MockHttpClient::new());
        let provider = ProviderSpec::new("playai", "https://api.playai.com/tts", "");
        let speech = VoiceRouting::default().route("Bonjour", None);

        let err = backend.synthesize(&provider, &speech).await.unwrap_err();

        assert!(err.to_string().contains("API key"));
        assert!(backend.client.requests().is_empty());
    }
}
