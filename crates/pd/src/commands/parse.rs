//! `pd parse` command implementation.

use clap::Args;
use pd_directive::{FileResolver, parse_command};

use crate::commands::{CommonArgs, read_input, to_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the parse command.
#[derive(Args)]
pub(crate) struct ParseArgs {
    /// Command text (default: read stdin).
    text: Option<String>,

    /// Report the raw `--file` value instead of resolving it.
    #[arg(long)]
    no_file: bool,
}

impl ParseArgs {
    /// Execute the parse command.
    pub(crate) fn execute(self, common: &CommonArgs) -> Result<(), CliError> {
        let config = common.load_config()?;
        let registry = config.registry()?;
        let text = read_input(self.text)?;

        let resolver = (!self.no_file).then(|| FileResolver::new(&config.fetch.settings()));
        let params = parse_command(&text, &registry, resolver.as_ref());

        Output::new().data(&to_json(&params)?);
        Ok(())
    }
}
