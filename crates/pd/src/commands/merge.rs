//! `pd merge` command implementation.

use clap::Args;
use pd_template::{TemplateMerge, TemplateMerger, TemplateStore};
use serde_json::{Value, json};
use tracing::info;

use crate::commands::{CommonArgs, read_input, to_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the merge command.
#[derive(Args)]
pub(crate) struct MergeArgs {
    /// Prompt, optionally starting with a template name (default: read stdin).
    prompt: Option<String>,

    /// Print the template name and final field values instead of the workflow.
    #[arg(long)]
    fields: bool,
}

impl MergeArgs {
    /// Execute the merge command.
    pub(crate) fn execute(self, common: &CommonArgs) -> Result<(), CliError> {
        let config = common.load_config()?;
        let store = TemplateStore::new(&config.templates_resolved.dir)
            .with_default(config.templates_resolved.default.clone());
        info!("Using templates from {}", store.dir().display());

        let merger = TemplateMerger::new(store, config.registry()?);
        let prompt = read_input(self.prompt)?;
        let result = merger.merge_template(&prompt);

        let text = if self.fields {
            to_json(&summary(&result))?
        } else {
            result.workflow_json()
        };
        Output::new().data(&text);
        Ok(())
    }
}

fn summary(result: &TemplateMerge) -> Value {
    json!({
        "template": result.template,
        "positive": result.positive,
        "fields": result.fields,
        "command_text": result.command_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_directive::Registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let merger = TemplateMerger::new(TemplateStore::new(temp_dir.path()), Registry::standard());
        let result = merger.merge_template("a cat --steps 30 --seed 5");

        let value = summary(&result);
        assert_eq!(value["template"], "txt2img");
        assert_eq!(value["positive"], "a cat");
        assert_eq!(value["fields"]["steps"], 30);
        assert_eq!(value["fields"]["seed"], 5);
        assert_eq!(value["fields"]["pos"], "a cat");
        assert!(
            value["command_text"]
                .as_str()
                .unwrap()
                .starts_with("a cat --pos a cat")
        );
    }
}
