//! `pd chat` command implementation.

use clap::Args;
use pd_template::extract_prompt;
use serde_json::Value;

use crate::commands::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the chat command.
#[derive(Args)]
pub(crate) struct ChatArgs {
    /// Chat request body as JSON (default: read stdin).
    body: Option<String>,
}

impl ChatArgs {
    /// Execute the chat command.
    ///
    /// Unlike a request handler, a malformed body is reported as an error.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let body: Value = serde_json::from_str(&read_input(self.body)?)?;
        Output::new().data(&extract_prompt(&body));
        Ok(())
    }
}
