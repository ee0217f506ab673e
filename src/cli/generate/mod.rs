//! Generate command - runs the text chain once from the terminal

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::chain::ChainRequest;
use crate::domain::generation::TEXT_GENERATION_CHAIN;
use crate::domain::{GenerationRequest, TextGenerator};
use crate::infrastructure::ChainFactory;
use crate::infrastructure::logging::init_logging;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Prompt words, joined with spaces
    #[arg(required = true)]
    pub prompt: Vec<String>,

    /// Overrides the default system prompt
    #[arg(long)]
    pub system: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl GenerateArgs {
    pub fn prompt(&self) -> String {
        self.prompt.join(" ")
    }

    fn request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(self.prompt());
        if let Some(system) = &self.system {
            request = request.with_system_prompt(system.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    let chain = ChainFactory::default().text_generation(&config.text_generation)?;
    let request = ChainRequest::new(args.request());

    let result = chain
        .generate(&request)
        .await
        .into_result(TEXT_GENERATION_CHAIN)?;

    info!(
        provider = %result.provider_used,
        attempts = result.attempts_made,
        "Generation succeeded"
    );
    println!("{}", result.output);

    Ok(())
}
