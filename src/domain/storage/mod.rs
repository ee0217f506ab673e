//! Audio storage - content-addressed cache of synthesized speech

mod entity;
mod repository;

pub use entity::{AudioKey, StoredAudio};
pub use repository::AudioRepository;

#[cfg(test)]
pub use repository::mock;
