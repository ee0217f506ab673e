//! Short-video pipeline

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::chain::ChainRequest;
use crate::domain::generation::{GenerationRequest, TEXT_GENERATION_CHAIN, TextGenerator};
use crate::domain::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH, RenderJob, RenderedVideo, VideoEncoder};
use crate::domain::speech::{SPEECH_SYNTHESIS_CHAIN, SpeechRequest, SpeechSynthesizer};
use crate::domain::storage::{AudioKey, AudioRepository, StoredAudio};
use crate::domain::DomainError;

pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Narration for a piece of text, fresh or from the cache
#[derive(Debug, Clone, Serialize)]
pub struct Narration {
    pub audio: StoredAudio,
    /// `None` when served from the cache
    pub provider_used: Option<String>,
    pub attempts_made: u32,
}

/// Result of a short run. Speech and render problems end up in `warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct ShortOutcome {
    pub correlation_id: String,
    pub script: String,
    pub provider_used: String,
    pub attempts_made: u32,
    pub audio: Option<Narration>,
    pub video: Option<RenderedVideo>,
    pub warnings: Vec<String>,
}

/// Orchestrates the three collaborators for `/api/short`
#[derive(Clone)]
pub struct ShortPipeline {
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    encoder: Arc<dyn VideoEncoder>,
    audio: Arc<dyn AudioRepository>,
    gate: Arc<Semaphore>,
    frame: (u32, u32),
}

impl std::fmt::Debug for ShortPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortPipeline")
            .field("available_permits", &self.gate.available_permits())
            .field("frame", &self.frame)
            .finish()
    }
}

impl ShortPipeline {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        encoder: Arc<dyn VideoEncoder>,
        audio: Arc<dyn AudioRepository>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            text,
            speech,
            encoder,
            audio,
            gate: Arc::new(Semaphore::new(max_concurrent.max(1))),
            frame: (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame = (width, height);
        self
    }

    /// Width and height used for pipeline renders
    pub fn frame_size(&self) -> (u32, u32) {
        self.frame
    }

    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// Voices `request`, reusing a stored clip for the same text and voice
    #[instrument(skip(self, request))]
    pub async fn narrate(
        &self,
        request: &SpeechRequest,
        correlation_id: &str,
    ) -> Result<Narration, DomainError> {
        if request.text.trim().is_empty() {
            return Err(DomainError::validation("Text is required"));
        }

        let routed = self.speech.route(request);
        let key = AudioKey::derive(&routed.text, &routed.voice);

        if let Some(audio) = self.audio.lookup(&key).await? {
            info!(file = %audio.file_name, "Reusing stored narration");
            return Ok(Narration {
                audio,
                provider_used: None,
                attempts_made: 0,
            });
        }

        let chain_request = ChainRequest::new(routed).with_correlation_id(correlation_id);
        let success = self
            .speech
            .synthesize(&chain_request)
            .await
            .into_result(SPEECH_SYNTHESIS_CHAIN)?;

        let audio = self.audio.store(&key, &success.output).await?;

        Ok(Narration {
            audio,
            provider_used: Some(success.provider_used),
            attempts_made: success.attempts_made,
        })
    }

    /// Renders a caller-supplied job under the concurrency gate
    #[instrument(skip(self, job), fields(output = %job.output_name))]
    pub async fn render(&self, job: &RenderJob) -> Result<RenderedVideo, DomainError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DomainError::internal("Pipeline gate closed"))?;

        self.encoder.render(job).await
    }

    /// Generates a script, then narrates and renders it under the concurrency gate
    #[instrument(skip(self, prompt))]
    pub async fn run(
        &self,
        prompt: &str,
        correlation_id: Option<String>,
    ) -> Result<ShortOutcome, DomainError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DomainError::validation("No prompt provided"));
        }

        let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let request = ChainRequest::new(GenerationRequest::new(prompt))
            .with_correlation_id(correlation_id.clone());

        let script = self
            .text
            .generate(&request)
            .await
            .into_result(TEXT_GENERATION_CHAIN)?;

        let mut outcome = ShortOutcome {
            correlation_id: correlation_id.clone(),
            script: script.output,
            provider_used: script.provider_used,
            attempts_made: script.attempts_made,
            audio: None,
            video: None,
            warnings: Vec::new(),
        };

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DomainError::internal("Pipeline gate closed"))?;

        match self
            .narrate(&SpeechRequest::new(outcome.script.clone()), &correlation_id)
            .await
        {
            Ok(narration) => outcome.audio = Some(narration),
            Err(e) => {
                warn!(correlation_id = %correlation_id, error = %e, "Narration failed, returning script only");
                outcome.warnings.push(format!("speech: {}", e));
                return Ok(outcome);
            }
        }

        if let Some(narration) = &outcome.audio {
            let job = RenderJob::new(
                narration.audio.path.clone(),
                format!("short_{}.mp4", Uuid::new_v4().simple()),
            )
            .with_size(self.frame.0, self.frame.1);

            match self.encoder.render(&job).await {
                Ok(video) => outcome.video = Some(video),
                Err(e) => {
                    warn!(correlation_id = %correlation_id, error = %e, "Render failed");
                    outcome.warnings.push(format!("render: {}", e));
                }
            }
        }

        info!(
            correlation_id = %correlation_id,
            warnings = outcome.warnings.len(),
            "Short completed"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::MockTextGenerator;
    use crate::domain::render::MockVideoEncoder;
    use crate::domain::speech::MockSpeechSynthesizer;
    use crate::domain::storage::mock::MockAudioRepository;

    fn pipeline(
        text: MockTextGenerator,
        speech: MockSpeechSynthesizer,
        encoder: Arc<MockVideoEncoder>,
        audio: Arc<MockAudioRepository>,
    ) -> ShortPipeline {
        ShortPipeline::new(Arc::new(text), Arc::new(speech), encoder, audio, 3)
    }

    #[tokio::test]
    async fn test_run_produces_script_audio_and_video() {
        let encoder = Arc::new(MockVideoEncoder::new());
        let audio = Arc::new(MockAudioRepository::new());
        let pipeline = pipeline(
            MockTextGenerator::succeeding("Les chats dorment 16h par jour"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            encoder.clone(),
            audio.clone(),
        )
        .with_frame_size(720, 1280);

        let outcome = pipeline
            .run("chats", Some("req-1".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.correlation_id, "req-1");
        assert_eq!(outcome.script, "Les chats dorment 16h par jour");
        assert_eq!(outcome.provider_used, "mock/text");
        assert!(outcome.warnings.is_empty());
        assert!(outcome.video.is_some());

        let narration = outcome.audio.unwrap();
        assert_eq!(narration.provider_used.as_deref(), Some("mock/speech"));
        assert!(narration.audio.file_name.ends_with(".mp3"));

        let jobs = encoder.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].audio_path, narration.audio.path);
        assert_eq!((jobs[0].width, jobs[0].height), (720, 1280));
        assert_eq!(audio.len(), 1);
    }

    #[tokio::test]
    async fn test_text_exhaustion_is_an_error() {
        let encoder = Arc::new(MockVideoEncoder::new());
        let pipeline = pipeline(
            MockTextGenerator::exhausted(),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            encoder.clone(),
            Arc::new(MockAudioRepository::new()),
        );

        let err = pipeline.run("chats", None).await.unwrap_err();

        assert!(matches!(err, DomainError::Exhausted { .. }));
        assert!(encoder.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_speech_exhaustion_returns_script_with_warning() {
        let encoder = Arc::new(MockVideoEncoder::new());
        let pipeline = pipeline(
            MockTextGenerator::succeeding("script"),
            MockSpeechSynthesizer::exhausted(),
            encoder.clone(),
            Arc::new(MockAudioRepository::new()),
        );

        let outcome = pipeline.run("chats", None).await.unwrap();

        assert_eq!(outcome.script, "script");
        assert!(outcome.audio.is_none());
        assert!(outcome.video.is_none());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("speech:"));
        assert!(encoder.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_is_a_warning() {
        let pipeline = pipeline(
            MockTextGenerator::succeeding("script"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            Arc::new(MockVideoEncoder::failing("ffmpeg exited with status 1")),
            Arc::new(MockAudioRepository::new()),
        );

        let outcome = pipeline.run("chats", None).await.unwrap();

        assert!(outcome.audio.is_some());
        assert!(outcome.video.is_none());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("ffmpeg exited"));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let text = Arc::new(MockTextGenerator::succeeding("unused"));
        let pipeline = ShortPipeline::new(
            text.clone(),
            Arc::new(MockSpeechSynthesizer::succeeding(b"ID3")),
            Arc::new(MockVideoEncoder::new()),
            Arc::new(MockAudioRepository::new()),
            3,
        );

        let err = pipeline.run("   ", None).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(text.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_narrate_reuses_stored_audio() {
        let audio = Arc::new(MockAudioRepository::new());
        let pipeline = pipeline(
            MockTextGenerator::succeeding("unused"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            Arc::new(MockVideoEncoder::new()),
            audio.clone(),
        );
        let request = SpeechRequest::new("bonjour");

        let first = pipeline.narrate(&request, "a").await.unwrap();
        let second = pipeline.narrate(&request, "b").await.unwrap();

        assert!(!first.audio.cached);
        assert!(second.audio.cached);
        assert_eq!(second.provider_used, None);
        assert_eq!(first.audio.file_name, second.audio.file_name);
        assert_eq!(audio.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_from_narrate() {
        let pipeline = pipeline(
            MockTextGenerator::succeeding("unused"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            Arc::new(MockVideoEncoder::new()),
            Arc::new(MockAudioRepository::new().with_error("disk full")),
        );

        let err = pipeline
            .narrate(&SpeechRequest::new("bonjour"), "a")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_render_passes_job_through_gate() {
        let encoder = Arc::new(MockVideoEncoder::new());
        let pipeline = pipeline(
            MockTextGenerator::succeeding("unused"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            encoder.clone(),
            Arc::new(MockAudioRepository::new()),
        );

        let video = pipeline
            .render(&RenderJob::new("/audio/a.mp3", "clip.mp4"))
            .await
            .unwrap();

        assert_eq!(video.file_name, "clip.mp4");
        assert_eq!(encoder.jobs().len(), 1);
        assert_eq!(pipeline.available_permits(), DEFAULT_MAX_CONCURRENT);
    }

    #[tokio::test]
    async fn test_gate_permits_are_released() {
        let pipeline = pipeline(
            MockTextGenerator::succeeding("script"),
            MockSpeechSynthesizer::succeeding(b"ID3"),
            Arc::new(MockVideoEncoder::new()),
            Arc::new(MockAudioRepository::new()),
        );

        let runs = (0..6).map(|_| pipeline.run("chats", None));
        let results = futures::future::join_all(runs).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(pipeline.available_permits(), DEFAULT_MAX_CONCURRENT);
    }
}
