//! Infrastructure layer - HTTP providers, ffmpeg and the filesystem

pub mod factory;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod render;
pub mod speech;
pub mod storage;
pub mod transcription;

pub use factory::{ChainFactory, env_lookup};
pub use http_client::{HttpClient, HttpClientTrait};
