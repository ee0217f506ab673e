//! Audio repository trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::speech::SynthesizedAudio;
use crate::domain::DomainError;

use super::entity::{AudioKey, StoredAudio};

/// Persists synthesized audio under its content address
#[async_trait]
pub trait AudioRepository: Send + Sync + Debug {
    /// Returns the stored clip for this key, if any
    async fn lookup(&self, key: &AudioKey) -> Result<Option<StoredAudio>, DomainError>;

    /// Writes the clip; an existing file with the same key is reused
    async fn store(&self, key: &AudioKey, audio: &SynthesizedAudio)
        -> Result<StoredAudio, DomainError>;
}
