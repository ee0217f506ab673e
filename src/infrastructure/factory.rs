//! Builds the provider chains from configuration

use std::sync::Arc;

use tracing::warn;

use crate::config::{ChainConfig, ProviderConfig, SpeechConfig};
use crate::domain::chain::ProviderSpec;
use crate::domain::speech::{SpeechBackend, SpeechSynthesisChain, SpeechTransport};
use crate::domain::{DomainError, TextGenerationChain, TranscriptionChain};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::llm::ChatCompletionsTransport;
use crate::infrastructure::speech::{
    GOOGLE_TRANSLATE, GoogleTranslateBackend, PLAYAI, PlayAiBackend,
};
use crate::infrastructure::transcription::WhisperTransport;

pub type HttpTextGenerationChain = TextGenerationChain<ChatCompletionsTransport<HttpClient>>;
pub type HttpTranscriptionChain = TranscriptionChain<WhisperTransport<HttpClient>>;

/// Resolves an environment variable name to its value
pub type KeyLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Reads keys from the process environment
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Factory for the three chains. Key resolution is injected so nothing reads globals directly.
pub struct ChainFactory {
    http: HttpClient,
    lookup: Box<KeyLookup>,
}

impl std::fmt::Debug for ChainFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainFactory").finish_non_exhaustive()
    }
}

impl Default for ChainFactory {
    fn default() -> Self {
        Self::new(HttpClient::new())
    }
}

impl ChainFactory {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            lookup: Box::new(env_lookup),
        }
    }

    pub fn with_key_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    fn specs(&self, providers: &[ProviderConfig]) -> Vec<ProviderSpec> {
        providers
            .iter()
            .map(|provider| {
                let spec = provider.to_spec(|name| (self.lookup)(name));
                if provider.api_key_env.is_some() && spec.api_key().is_none() {
                    warn!(
                        provider = %spec.label(),
                        env = provider.api_key_env.as_deref().unwrap_or_default(),
                        "API key variable is not set"
                    );
                }
                spec
            })
            .collect()
    }

    pub fn text_generation(&self, config: &ChainConfig) -> Result<HttpTextGenerationChain, DomainError> {
        TextGenerationChain::new(
            self.specs(&config.providers),
            config.retry.to_policy()?,
            ChatCompletionsTransport::new(self.http.clone()),
        )
    }

    pub fn transcription(&self, config: &ChainConfig) -> Result<HttpTranscriptionChain, DomainError> {
        TranscriptionChain::new(
            self.specs(&config.providers),
            config.retry.to_policy()?,
            WhisperTransport::new(self.http.clone()),
        )
    }

    /// Speech providers are dispatched by name; every configured name must have a backend
    pub fn speech(&self, config: &SpeechConfig) -> Result<SpeechSynthesisChain, DomainError> {
        let mut transport = SpeechTransport::new();

        for provider in &config.providers {
            let backend: Arc<dyn SpeechBackend> = match provider.name.as_str() {
                PLAYAI => Arc::new(PlayAiBackend::new(self.http.clone())),
                GOOGLE_TRANSLATE => Arc::new(GoogleTranslateBackend::new(self.http.clone())),
                other => {
                    return Err(DomainError::configuration(format!(
                        "Unknown speech provider '{}'",
                        other
                    )));
                }
            };
            transport = transport.with_backend(provider.name.clone(), backend);
        }

        SpeechSynthesisChain::new(
            self.specs(&config.providers),
            config.retry.to_policy()?,
            config.routing.clone(),
            transport,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, RetryConfig};

    fn factory() -> ChainFactory {
        ChainFactory::default()
            .with_key_lookup(|name| (name == "GROQ_API_KEY").then(|| "gsk".to_string()))
    }

    #[test]
    fn test_builds_default_chains() {
        let config = AppConfig::default();
        let factory = factory();

        let text = factory.text_generation(&config.text_generation).unwrap();
        assert_eq!(text.inner().providers().len(), 3);
        assert_eq!(text.inner().retry_policy().max_attempts(), 4);
        assert!(text.inner().providers().iter().all(|p| p.api_key() == Some("gsk")));

        let speech = factory.speech(&config.speech).unwrap();
        assert_eq!(speech.inner().providers()[0].label(), "playai");
        assert_eq!(speech.inner().providers()[0].api_key(), None);
        assert!(speech.inner().transport().has_backend(GOOGLE_TRANSLATE));

        let transcription = factory.transcription(&config.transcription).unwrap();
        assert_eq!(transcription.inner().retry_policy().max_attempts(), 1);
    }

    #[test]
    fn test_unknown_speech_provider_is_configuration_error() {
        let mut config = AppConfig::default().speech;
        config
            .providers
            .push(ProviderConfig::new("espeak", "http://localhost", "", None));

        let err = factory().speech(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let config = ChainConfig {
            providers: vec![],
            retry: RetryConfig::attempts(1),
        };
        assert!(factory().text_generation(&config).is_err());
    }
}
