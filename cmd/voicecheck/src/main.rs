//! voicecheck - AI-generated voice detection service.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod server;

use commands::{EncodeCommand, ServeCommand};

/// voicecheck - classify speech clips as AI_GENERATED or HUMAN.
///
/// Runs an HTTP service that accepts base64-encoded audio and returns a
/// verdict with a confidence score, plus tooling for preparing requests.
#[derive(Parser)]
#[command(name = "voicecheck")]
#[command(about = "AI-generated voice detection service")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the detection HTTP service
    Serve(ServeCommand),
    /// Encode a directory of audio files into a batch request file
    Encode(EncodeCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Serve(cmd) => cmd.run(&cli).await,
        Commands::Encode(cmd) => cmd.run(&cli),
    }
}
