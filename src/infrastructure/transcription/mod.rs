//! Speech-to-text transports

mod whisper;

pub use whisper::WhisperTransport;
