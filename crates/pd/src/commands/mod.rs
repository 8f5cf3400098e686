//! CLI command implementations.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use pd_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) mod chat;
pub(crate) mod merge;
pub(crate) mod parse;
pub(crate) mod save;
pub(crate) mod tokenize;

pub(crate) use chat::ChatArgs;
pub(crate) use merge::MergeArgs;
pub(crate) use parse::ParseArgs;
pub(crate) use save::SaveTextArgs;
pub(crate) use tokenize::TokenizeArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover pd.toml).
    #[arg(short, long, global = true, env = "PD_CONFIG")]
    config: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Template used when the prompt names none (overrides config).
    #[arg(long, global = true)]
    default_template: Option<String>,

    /// Root directory for saved outputs (overrides config).
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    /// Load configuration with command-line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            templates_dir: self.templates_dir.clone(),
            default_template: self.default_template.clone(),
            output_root: self.output_root.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Use `arg` when given, otherwise read all of stdin.
pub(crate) fn read_input(arg: Option<String>) -> Result<String, CliError> {
    if let Some(text) = arg {
        return Ok(text);
    }
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Pretty JSON for stdout.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
