use async_trait::async_trait;

use crate::domain::chain::ProviderSpec;
use crate::domain::speech::{RoutedSpeech, SpeechBackend, SynthesizedAudio};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Longest text the free endpoint accepts in one request
pub const MAX_TEXT_CHARS: usize = 200;

/// Free translate-TTS endpoint, keyed by language rather than voice
#[derive(Debug)]
pub struct GoogleTranslateBackend<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> GoogleTranslateBackend<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[async_trait]
impl<C: HttpClientTrait> SpeechBackend for GoogleTranslateBackend<C> {
    async fn synthesize(
        &self,
        provider: &ProviderSpec,
        speech: &RoutedSpeech,
    ) -> Result<SynthesizedAudio, DomainError> {
        let text = truncate_chars(&speech.text, MAX_TEXT_CHARS);
        let query = [
            ("ie", "UTF-8"),
            ("client", "tw-ob"),
            ("tl", speech.language.as_str()),
            ("q", text),
        ];

        let body = self
            .client
            .get_bytes(provider.endpoint(), vec![("User-Agent", "Mozilla/5.0")], &query)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => {
                    DomainError::provider(provider.label(), message)
                }
                other => other,
            })?;

        Ok(SynthesizedAudio::new(body.bytes, "audio/mpeg"))
    }
}
