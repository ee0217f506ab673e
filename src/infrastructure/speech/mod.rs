//! Speech synthesis backends

mod google_translate;
mod playai;

pub use google_translate::{GoogleTranslateBackend, MAX_TEXT_CHARS};
pub use playai::PlayAiBackend;

/// Backend names recognised in speech provider configuration
pub const PLAYAI: &str = "playai";
pub const GOOGLE_TRANSLATE: &str = "google-translate";
