//! CLI module for the shorts gateway
//!
//! - `serve`: HTTP API and static files
//! - `generate`: one-off run of the text chain

pub mod generate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Shorts gateway - resilient provider chains for short-video generation
#[derive(Parser)]
#[command(name = "shorts-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Generate a script once and print it
    Generate(generate::GenerateArgs),
}
