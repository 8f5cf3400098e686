//! PD CLI - Prompt directive engine.
//!
//! Provides commands for:
//! - `tokenize`: Show the directives found in a text
//! - `parse`: Turn a command text into generation parameters
//! - `merge`: Merge a prompt into its workflow template
//! - `chat`: Extract the prompt from a chat request body
//! - `save-text`: Save texts under the output root

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ChatArgs, CommonArgs, MergeArgs, ParseArgs, SaveTextArgs, TokenizeArgs};
use output::Output;

/// PD - Prompt directive engine.
#[derive(Parser)]
#[command(name = "pd", version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the directives and residual text of a prompt.
    Tokenize(TokenizeArgs),
    /// Parse a command text into generation parameters.
    Parse(ParseArgs),
    /// Merge a prompt into its workflow template.
    Merge(MergeArgs),
    /// Extract the prompt from a chat request body.
    Chat(ChatArgs),
    /// Save texts under the output root.
    SaveText(SaveTextArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.common.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Tokenize(args) => args.execute(),
        Commands::Parse(args) => args.execute(&cli.common),
        Commands::Merge(args) => args.execute(&cli.common),
        Commands::Chat(args) => args.execute(),
        Commands::SaveText(args) => args.execute(&cli.common),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
