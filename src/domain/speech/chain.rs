//! Speech synthesis chain - primary paid provider, free fallback

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{RoutedSpeech, VoiceRouting};
use crate::domain::chain::{
    ChainRequest, ChainResult, FallbackChain, OutputExtractor, ProviderSpec, ProviderTransport,
    RetryPolicy,
};
use crate::domain::DomainError;

pub const SPEECH_SYNTHESIS_CHAIN: &str = "speech_synthesis";

/// Text-to-speech input as received from callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

/// Audio returned by a speech backend
#[derive(Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Bytes,
    pub content_type: String,
}

impl SynthesizedAudio {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the content type, mp3 when unknown
    pub fn extension(&self) -> &'static str {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        match essence {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" | "audio/opus" => "ogg",
            "audio/flac" => "flac",
            _ => "mp3",
        }
    }
}

impl fmt::Debug for SynthesizedAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesizedAudio")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// One concrete speech API (paid JSON endpoint, free translate endpoint, ...)
#[async_trait]
pub trait SpeechBackend: Send + Sync + fmt::Debug {
    async fn synthesize(
        &self,
        provider: &ProviderSpec,
        speech: &RoutedSpeech,
    ) -> Result<SynthesizedAudio, DomainError>;
}

/// Dispatches each provider entry to the backend registered under its name
#[derive(Debug, Clone, Default)]
pub struct SpeechTransport {
    backends: HashMap<String, Arc<dyn SpeechBackend>>,
}

impl SpeechTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, name: impl Into<String>, backend: Arc<dyn SpeechBackend>) -> Self {
        self.backends.insert(name.into(), backend);
        self
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }
}

#[async_trait]
impl ProviderTransport for SpeechTransport {
    type Request = RoutedSpeech;
    type Payload = SynthesizedAudio;

    async fn send(
        &self,
        provider: &ProviderSpec,
        request: &RoutedSpeech,
    ) -> Result<SynthesizedAudio, DomainError> {
        let backend = self.backends.get(provider.name()).ok_or_else(|| {
            DomainError::provider(provider.name(), "No speech backend registered")
        })?;

        backend.synthesize(provider, request).await
    }
}

/// Accepts any non-empty audio payload
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyAudio;

impl OutputExtractor<SynthesizedAudio> for NonEmptyAudio {
    type Output = SynthesizedAudio;

    fn extract(&self, payload: SynthesizedAudio) -> Option<SynthesizedAudio> {
        (!payload.is_empty()).then_some(payload)
    }
}

/// Anything that can voice a script
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Pre-routing step, applied before any provider is tried
    fn route(&self, request: &SpeechRequest) -> RoutedSpeech;

    async fn synthesize(&self, request: &ChainRequest<RoutedSpeech>) -> ChainResult<SynthesizedAudio>;
}

/// Fallback chain configured for speech providers
#[derive(Debug)]
pub struct SpeechSynthesisChain<T = SpeechTransport> {
    routing: VoiceRouting,
    chain: FallbackChain<T, NonEmptyAudio>,
}

impl<T> SpeechSynthesisChain<T>
where
    T: ProviderTransport<Request = RoutedSpeech, Payload = SynthesizedAudio>,
{
    pub fn new(
        providers: Vec<ProviderSpec>,
        retry: RetryPolicy,
        routing: VoiceRouting,
        transport: T,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            routing,
            chain: FallbackChain::new(SPEECH_SYNTHESIS_CHAIN, providers, retry, transport, NonEmptyAudio)?,
        })
    }

    pub fn routing(&self) -> &VoiceRouting {
        &self.routing
    }

    pub fn inner(&self) -> &FallbackChain<T, NonEmptyAudio> {
        &self.chain
    }

    /// Routes the request, then runs the chain under the same correlation id
    pub async fn execute(&self, request: &ChainRequest<SpeechRequest>) -> ChainResult<SynthesizedAudio> {
        let input = request.input();
        let routed = ChainRequest::new(self.routing.route(&input.text, input.voice.as_deref()))
            .with_correlation_id(request.correlation_id());

        self.chain.execute(&routed).await
    }
}

#[async_trait]
impl<T> SpeechSynthesizer for SpeechSynthesisChain<T>
where
    T: ProviderTransport<Request = RoutedSpeech, Payload = SynthesizedAudio>,
{
    fn route(&self, request: &SpeechRequest) -> RoutedSpeech {
        self.routing.route(&request.text, request.voice.as_deref())
    }

    async fn synthesize(&self, request: &ChainRequest<RoutedSpeech>) -> ChainResult<SynthesizedAudio> {
        self.chain.execute(request).await
    }
}
