//! Language model transports

mod chat_completions;

pub use chat_completions::ChatCompletionsTransport;
