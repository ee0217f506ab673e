use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::domain::chain::{BackoffPolicy, DEFAULT_TIMEOUT_MS, ProviderSpec, RetryPolicy};
use crate::domain::pipeline::DEFAULT_MAX_CONCURRENT;
use crate::domain::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::domain::speech::VoiceRouting;
use crate::domain::DomainError;

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(deserialize_with = "text_generation_section")]
    pub text_generation: ChainConfig,
    pub speech: SpeechConfig,
    #[serde(deserialize_with = "transcription_section")]
    pub transcription: ChainConfig,
    pub render: RenderConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static front-end served at `/` when the directory exists
    pub public_dir: PathBuf,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// One provider entry of a chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ProviderConfig {
    pub fn new(name: &str, endpoint: &str, model: &str, api_key_env: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_key_env: api_key_env.map(str::to_string),
        }
    }

    /// Builds the provider, resolving its key through `lookup`.
    /// A configured but unset key variable leaves the provider keyless.
    pub fn to_spec(&self, lookup: impl Fn(&str) -> Option<String>) -> ProviderSpec {
        let spec = ProviderSpec::new(&self.name, &self.endpoint, &self.model)
            .with_timeout(Duration::from_millis(self.timeout_ms));

        match self.api_key_env.as_deref().and_then(lookup) {
            Some(key) if !key.trim().is_empty() => spec.with_api_key(key.trim()),
            _ => spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::attempts(1)
    }
}

impl RetryConfig {
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffPolicy::default(),
        }
    }

    pub fn to_policy(&self) -> Result<RetryPolicy, DomainError> {
        RetryPolicy::new(self.max_attempts, self.backoff)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub providers: Vec<ProviderConfig>,
    pub retry: RetryConfig,
}

/// A chain section as written in a config source; absent keys keep the chain's built-in value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChainSection {
    providers: Option<Vec<ProviderConfig>>,
    retry: RetrySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RetrySection {
    max_attempts: Option<u32>,
    backoff: Option<BackoffPolicy>,
}

impl ChainSection {
    fn over(self, base: ChainConfig) -> ChainConfig {
        ChainConfig {
            providers: self.providers.unwrap_or(base.providers),
            retry: RetryConfig {
                max_attempts: self.retry.max_attempts.unwrap_or(base.retry.max_attempts),
                backoff: self.retry.backoff.unwrap_or(base.retry.backoff),
            },
        }
    }
}

fn text_generation_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ChainConfig, D::Error> {
    ChainSection::deserialize(deserializer).map(|section| section.over(ChainConfig::text_generation()))
}

fn transcription_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ChainConfig, D::Error> {
    ChainSection::deserialize(deserializer).map(|section| section.over(ChainConfig::transcription()))
}

impl ChainConfig {
    /// Groq models tried in order, four attempts each
    pub fn text_generation() -> Self {
        Self {
            providers: ["llama-3.1-8b-instant", "llama-3.1-70b", "mixtral-8x7b"]
                .into_iter()
                .map(|model| ProviderConfig::new("groq", GROQ_ENDPOINT, model, Some("GROQ_API_KEY")))
                .collect(),
            retry: RetryConfig::attempts(4),
        }
    }

    pub fn transcription() -> Self {
        Self {
            providers: ["whisper-large-v3-turbo", "whisper-large-v3"]
                .into_iter()
                .map(|model| ProviderConfig::new("groq", GROQ_ENDPOINT, model, Some("GROQ_API_KEY")))
                .collect(),
            retry: RetryConfig::attempts(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub providers: Vec<ProviderConfig>,
    pub retry: RetryConfig,
    pub routing: VoiceRouting,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfig::new("playai", "https://api.playai.com/tts", "", Some("PLAYAI_API_KEY")),
                ProviderConfig::new(
                    "google-translate",
                    "https://translate.google.com/translate_tts",
                    "",
                    None,
                ),
            ],
            retry: RetryConfig::attempts(1),
            routing: VoiceRouting::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub ffmpeg_path: String,
    pub output_dir: PathBuf,
    pub image_secs: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub audio_dir: PathBuf,
    /// Images and music that render requests may reference by file name
    pub media_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrent: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            text_generation: ChainConfig::text_generation(),
            speech: SpeechConfig::default(),
            transcription: ChainConfig::transcription(),
            render: RenderConfig::default(),
            storage: StorageConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            body_limit_bytes: 15 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            output_dir: PathBuf::from("videos"),
            image_secs: 3,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            media_dir: PathBuf::from("media"),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
