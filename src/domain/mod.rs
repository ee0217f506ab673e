//! Domain layer - provider chains and the shorts pipeline built on them

pub mod chain;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod render;
pub mod speech;
pub mod storage;
pub mod transcription;

pub use chain::{
    AttemptFailure, BackoffPolicy, ChainRequest, ChainResult, ChainSuccess, FailureKind,
    FallbackChain, ProviderSpec, RetryPolicy,
};
pub use error::DomainError;
pub use generation::{GenerationRequest, TextGenerationChain, TextGenerator};
pub use pipeline::{Narration, ShortOutcome, ShortPipeline};
pub use render::{RenderJob, RenderedVideo, SubtitleCue, VideoEncoder};
pub use speech::{SpeechRequest, SpeechSynthesisChain, SpeechSynthesizer, SynthesizedAudio};
pub use storage::{AudioKey, AudioRepository, StoredAudio};
pub use transcription::{Transcriber, Transcript, TranscriptionChain, TranscriptionRequest};
