//! Transcription - audio to text through a chain of speech-to-text models

mod chain;

pub use chain::{
    FieldCandidate, TRANSCRIPT_FIELDS, TRANSCRIPTION_CHAIN, Transcriber, Transcript,
    TranscriptExtractor, TranscriptionChain, TranscriptionRequest, UNPARSED_PREVIEW_CHARS,
};

#[cfg(test)]
pub use chain::mock::MockTranscriber;
