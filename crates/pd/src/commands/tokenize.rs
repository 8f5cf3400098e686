//! `pd tokenize` command implementation.

use clap::Args;
use pd_directive::{Tokenized, tokenize};
use serde_json::{Value, json};

use crate::commands::{read_input, to_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tokenize command.
#[derive(Args)]
pub(crate) struct TokenizeArgs {
    /// Text to scan (default: read stdin).
    text: Option<String>,
}

impl TokenizeArgs {
    /// Execute the tokenize command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let text = read_input(self.text)?;
        let tokens = tokenize(&text);
        Output::new().data(&to_json(&render(&tokens))?);
        Ok(())
    }
}

fn render(tokens: &Tokenized) -> Value {
    let directives: Vec<Value> = tokens
        .directives
        .iter()
        .map(|directive| {
            json!({
                "key": directive.key,
                "value": directive.value,
                "start": directive.span.start,
                "end": directive.span.end,
            })
        })
        .collect();

    json!({
        "directives": directives,
        "residual": tokens.residual,
    })
}
