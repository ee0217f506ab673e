//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChainConfig, LogFormat, LoggingConfig, PipelineConfig, ProviderConfig,
    RenderConfig, RetryConfig, ServerConfig, SpeechConfig, StorageConfig,
};
