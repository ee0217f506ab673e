use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::speech::SynthesizedAudio;
use crate::domain::storage::{AudioKey, AudioRepository, StoredAudio};
use crate::domain::DomainError;

/// Extensions a stored clip may carry, probed in order on lookup
const KNOWN_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "flac"];

/// Audio cache on the local filesystem
#[derive(Debug, Clone)]
pub struct FileAudioStore {
    dir: PathBuf,
}

impl FileAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn find(&self, key: &AudioKey) -> Result<Option<StoredAudio>, DomainError> {
        for extension in KNOWN_EXTENSIONS {
            let file_name = key.file_name(extension);
            let path = self.dir.join(&file_name);
            if tokio::fs::try_exists(&path).await? {
                return Ok(Some(StoredAudio::new(file_name, path, true)));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl AudioRepository for FileAudioStore {
    async fn lookup(&self, key: &AudioKey) -> Result<Option<StoredAudio>, DomainError> {
        self.find(key).await
    }

    async fn store(
        &self,
        key: &AudioKey,
        audio: &SynthesizedAudio,
    ) -> Result<StoredAudio, DomainError> {
        if let Some(existing) = self.find(key).await? {
            debug!(file = %existing.file_name, "Audio already stored");
            return Ok(existing);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = key.file_name(audio.extension());
        let path = self.dir.join(&file_name);
        let partial = self.dir.join(format!(".{}.{}.part", file_name, Uuid::new_v4().simple()));

        tokio::fs::write(&partial, &audio.bytes).await?;
        tokio::fs::rename(&partial, &path).await?;

        debug!(file = %file_name, bytes = audio.bytes.len(), "Audio stored");
        Ok(StoredAudio::new(file_name, path, false))
    }
}
