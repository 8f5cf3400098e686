//! `pd save-text` command implementation.

use chrono::Local;
use clap::Args;
use pd_sandbox::OutputSandbox;

use crate::commands::{CommonArgs, read_input, to_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the save-text command.
#[derive(Args)]
pub(crate) struct SaveTextArgs {
    /// Path and file name prefix, relative to the output root.
    #[arg(short, long)]
    prefix: String,

    /// Texts to save, one file each (default: read stdin as a single text).
    texts: Vec<String>,
}

impl SaveTextArgs {
    /// Execute the save-text command.
    pub(crate) fn execute(self, common: &CommonArgs) -> Result<(), CliError> {
        let config = common.load_config()?;
        let sandbox = OutputSandbox::new(&config.output_resolved.root)?;

        let texts = if self.texts.is_empty() {
            vec![read_input(None)?]
        } else {
            self.texts
        };

        let saved = sandbox.save_texts(&self.prefix, &texts, Local::now().naive_local())?;

        let output = Output::new();
        output.success(&format!(
            "Saved {} file(s) under {}",
            saved.len(),
            sandbox.root().display()
        ));
        output.data(&to_json(&saved)?);
        Ok(())
    }
}
