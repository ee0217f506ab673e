//! Speech synthesis - script to audio through a chain of TTS providers

mod chain;
mod routing;

pub use chain::{
    NonEmptyAudio, SPEECH_SYNTHESIS_CHAIN, SpeechBackend, SpeechRequest, SpeechSynthesisChain,
    SpeechSynthesizer, SpeechTransport, SynthesizedAudio,
};
pub use routing::{RoutedSpeech, Script, VoiceRouting, detect_script};

#[cfg(test)]
pub use chain::mock::MockSpeechSynthesizer;
