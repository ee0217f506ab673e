//! Storage infrastructure - filesystem-backed audio cache

mod file_audio;

pub use file_audio::FileAudioStore;
