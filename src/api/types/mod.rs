//! HTTP request and response types

pub mod error;
pub mod json;
pub mod media;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use media::{
    GenerateRequest, GenerateResponse, ShortRequest, SpeechResponse, StatusResponse,
    TranscriptionResponse, TtsRequest, VideoRequest, VideoResponse,
};
