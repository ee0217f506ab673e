//! Audio storage entities

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Content address of a synthesized clip: `hex(sha256(text + voice))`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioKey(String);

impl AudioKey {
    pub fn derive(text: &str, voice: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(voice.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for AudioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An audio file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAudio {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// True when the file already existed and no provider was called
    pub cached: bool,
}

impl StoredAudio {
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>, cached: bool) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
            cached,
        }
    }
}
