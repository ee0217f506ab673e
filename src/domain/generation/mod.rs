//! Text generation - prompt to script through a chain of language models

mod chain;
mod request;

pub use chain::{
    GeneratedTextExtractor, TEXT_CANDIDATES, TEXT_GENERATION_CHAIN, TextCandidate,
    TextGenerationChain, TextGenerator,
};
pub use request::{DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT, GenerationRequest};

#[cfg(test)]
pub use chain::mock::MockTextGenerator;
