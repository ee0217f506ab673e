//! Transcription chain - ordered speech-to-text models, no per-model retries

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::domain::chain::{
    ChainRequest, ChainResult, FallbackChain, OutputExtractor, ProviderSpec, ProviderTransport,
    RetryPolicy,
};
use crate::domain::DomainError;

pub const TRANSCRIPTION_CHAIN: &str = "transcription";

/// Field names probed for the transcript, in priority order
pub const TRANSCRIPT_FIELDS: [&str; 3] = ["text", "transcript", "transcription"];

/// Characters of raw payload kept when no transcript field matches
pub const UNPARSED_PREVIEW_CHARS: usize = 500;

/// Audio to transcribe
#[derive(Clone)]
pub struct TranscriptionRequest {
    pub audio: Bytes,
    pub file_name: String,
    pub content_type: String,
}

impl TranscriptionRequest {
    pub fn new(audio: impl Into<Bytes>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            audio: audio.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for TranscriptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionRequest")
            .field("audio", &self.audio.len())
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Transcription output. `Unparsed` is a lossy fallback, not a real transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transcript {
    Parsed { text: String, field: &'static str },
    Unparsed { raw: String },
}

impl Transcript {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Parsed { text, .. } => text,
            Self::Unparsed { raw } => raw,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Parsed { field, .. } => Some(*field),
            Self::Unparsed { .. } => None,
        }
    }
}

/// Reads one transcript field from a payload
#[derive(Debug, Clone, Copy)]
pub struct FieldCandidate {
    field: &'static str,
}

impl FieldCandidate {
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// True when the field is present as a string with nothing but whitespace
    pub fn is_blank(&self, payload: &Value) -> bool {
        payload
            .get(self.field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.trim().is_empty())
    }

    pub fn apply(&self, payload: &Value) -> Option<Transcript> {
        payload
            .get(self.field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| Transcript::Parsed {
                text: text.to_string(),
                field: self.field,
            })
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Tries each field candidate, then degrades to a truncated raw payload.
/// A recognized field that is blank rejects the payload.
#[derive(Debug, Clone)]
pub struct TranscriptExtractor {
    candidates: Vec<FieldCandidate>,
    preview_chars: usize,
}

impl Default for TranscriptExtractor {
    fn default() -> Self {
        Self {
            candidates: TRANSCRIPT_FIELDS.into_iter().map(FieldCandidate::new).collect(),
            preview_chars: UNPARSED_PREVIEW_CHARS,
        }
    }
}

impl TranscriptExtractor {
    pub fn candidates(&self) -> &[FieldCandidate] {
        &self.candidates
    }
}

impl OutputExtractor<Value> for TranscriptExtractor {
    type Output = Transcript;

    fn extract(&self, payload: Value) -> Option<Transcript> {
        let raw = match &payload {
            Value::Null => return None,
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().to_string(),
            other => {
                if let Some(found) = self.candidates.iter().find_map(|c| c.apply(other)) {
                    return Some(found);
                }
                if self.candidates.iter().any(|c| c.is_blank(other)) {
                    return None;
                }
                other.to_string()
            }
        };

        Some(Transcript::Unparsed {
            raw: truncate_chars(&raw, self.preview_chars),
        })
    }
}

/// Anything that can turn audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: &ChainRequest<TranscriptionRequest>) -> ChainResult<Transcript>;
}

/// Fallback chain configured for transcription models
#[derive(Debug)]
pub struct TranscriptionChain<T> {
    chain: FallbackChain<T, TranscriptExtractor>,
}

impl<T> TranscriptionChain<T>
where
    T: ProviderTransport<Request = TranscriptionRequest, Payload = Value>,
{
    pub fn new(
        providers: Vec<ProviderSpec>,
        retry: RetryPolicy,
        transport: T,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            chain: FallbackChain::new(
                TRANSCRIPTION_CHAIN,
                providers,
                retry,
                transport,
                TranscriptExtractor::default(),
            )?,
        })
    }

    pub fn inner(&self) -> &FallbackChain<T, TranscriptExtractor> {
        &self.chain
    }

    pub async fn execute(&self, request: &ChainRequest<TranscriptionRequest>) -> ChainResult<Transcript> {
        self.chain.execute(request).await
    }
}

#[async_trait]
impl<T> Transcriber for TranscriptionChain<T>
where
    T: ProviderTransport<Request = TranscriptionRequest, Payload = Value>,
{
    async fn transcribe(&self, request: &ChainRequest<TranscriptionRequest>) -> ChainResult<Transcript> {
        self.execute(request).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::chain::{AttemptFailure, FailureKind};

    /// Transcriber returning a fixed transcript; `None` means exhausted
    #[derive(Debug)]
    pub struct MockTranscriber {
        transcript: Option<Transcript>,
    }

    impl MockTranscriber {
        pub fn parsed(text: impl Into<String>) -> Self {
            Self {
                transcript: Some(Transcript::Parsed {
                    text: text.into(),
                    field: "text",
                }),
            }
        }

        pub fn exhausted() -> Self {
            Self { transcript: None }
        }
    }

    #[async_trait]
    impl Transcriber for MockTranscriber {
        async fn transcribe(&self, _request: &ChainRequest<TranscriptionRequest>) -> ChainResult<Transcript> {
            match &self.transcript {
                Some(transcript) => ChainResult::Success {
                    output: transcript.clone(),
                    provider_used: "mock/whisper".to_string(),
                    attempts_made: 1,
                },
                None => ChainResult::Exhausted {
                    failures: vec![AttemptFailure::new(
                        FailureKind::Timeout,
                        "no response within 60000ms",
                        "mock/whisper",
                        1,
                    )],
                },
            }
        }
    }
}
