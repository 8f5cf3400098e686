//! Two-pass merge of template defaults and user directives.

use pd_directive::{Directive, Field, FieldTable, Registry, SIZE_KEY, merge, tokenize};
use tracing::debug;

use crate::document::TemplateDocument;
use crate::store::TemplateStore;

/// Result of merging a prompt into a template.
#[derive(Debug, Clone)]
pub struct TemplateMerge {
    /// Name of the selected template.
    pub template: String,
    /// Directive-free user text.
    pub positive: String,
    /// Final field values.
    pub fields: FieldTable,
    /// Template with the reconstructed directive text written back.
    pub document: TemplateDocument,
}

impl TemplateMerge {
    /// Text written into the anchor node: the user's prose followed by every
    /// field as a directive.
    #[must_use]
    pub fn command_text(&self) -> String {
        reconstruct(&self.positive, &self.fields)
    }

    /// Serialized workflow, `{}` when the template was empty or missing.
    #[must_use]
    pub fn workflow_json(&self) -> String {
        self.document.to_json_pretty()
    }
}

/// Merges prompts into workflow templates.
#[derive(Debug, Clone)]
pub struct TemplateMerger {
    store: TemplateStore,
    registry: Registry,
}

impl TemplateMerger {
    #[must_use]
    pub fn new(store: TemplateStore, registry: Registry) -> Self {
        Self { store, registry }
    }

    #[must_use]
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Select a template from `prompt` and merge the prompt into it.
    ///
    /// The anchor's own directives are merged first (their prose is
    /// dropped, and so is any `size`, which only applies from the prompt),
    /// then the user's. The user's prose seeds `pos` before their
    /// directives apply, so `--pos` replaces it and `--pos_` extends it.
    /// Template loading problems are logged and yield an empty workflow.
    #[must_use]
    pub fn merge_template(&self, prompt: &str) -> TemplateMerge {
        let selection = self.store.select(prompt);
        let mut document = self.store.load(&selection.name);

        let defaults = template_defaults(document.command_text().unwrap_or_default());
        let mut fields = merge(&self.registry.table(), &defaults);

        let user = tokenize(&selection.prompt);
        if !user.residual.is_empty() {
            fields.set_text(Field::Pos, user.residual.clone());
        }
        let fields = merge(&fields, &user.directives);

        let command_text = reconstruct(&user.residual, &fields);
        let updated = document.set_command_text(&command_text);
        debug!("merged prompt into {} ({updated} anchor nodes)", selection.name);

        TemplateMerge {
            template: selection.name,
            positive: user.residual,
            fields,
            document,
        }
    }
}

/// Directives of the anchor text, without `size`.
fn template_defaults(command_text: &str) -> Vec<Directive> {
    let (size, directives): (Vec<_>, Vec<_>) = tokenize(command_text)
        .directives
        .into_iter()
        .partition(|d| d.key == SIZE_KEY);
    if !size.is_empty() {
        debug!("ignoring --{SIZE_KEY} in template defaults");
    }
    directives
}

fn reconstruct(positive: &str, fields: &FieldTable) -> String {
    let directives = fields.to_directive_text();
    if positive.is_empty() {
        directives
    } else {
        format!("{positive} {directives}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_directive::{MAX_SEED, parse_command};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::fs;

    static_assertions::assert_impl_all!(super::TemplateMerger: Send, Sync);

    const TXT2IMG: &str = r#"{
  "3": {"class_type": "KSampler", "inputs": {"seed": 0, "model": ["4", 0]}},
  "6": {
    "class_type": "TextCommandParser",
    "inputs": {"command_text": "studio photo --steps 8 --cfg 4.5 --neg_ watermark --size 768x512"}
  }
}"#;

    fn merger_with(templates: &[(&str, &str)]) -> (tempfile::TempDir, TemplateMerger) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (name, content) in templates {
            fs::write(temp_dir.path().join(format!("{name}.json")), content).unwrap();
        }
        let merger = TemplateMerger::new(TemplateStore::new(temp_dir.path()), Registry::standard());
        (temp_dir, merger)
    }

    #[test]
    fn test_template_defaults_then_user_overrides() {
        let (_temp_dir, merger) = merger_with(&[("txt2img", TXT2IMG)]);
        let result = merger.merge_template("a cat --steps 30 --neg blurry");

        assert_eq!(result.template, "txt2img");
        assert_eq!(result.positive, "a cat");
        assert_eq!(result.fields.text(Field::Pos), "a cat");
        assert_eq!(result.fields.integer(Field::Steps), 30);
        assert_eq!(result.fields.float(Field::Cfg), 4.5);
        assert_eq!(result.fields.text(Field::Neg), "blurry, watermark");
        assert_eq!(result.fields.integer(Field::Width), 512);
        assert_eq!(result.fields.integer(Field::Height), 512);
        assert!((0..=MAX_SEED).contains(&result.fields.integer(Field::Seed)));
    }

    #[test]
    fn test_command_text_written_back() {
        let (_temp_dir, merger) = merger_with(&[("txt2img", TXT2IMG)]);
        let result = merger.merge_template("a cat --seed 7");

        let workflow: Value = serde_json::from_str(&result.workflow_json()).unwrap();
        let command_text = workflow["6"]["inputs"]["command_text"].as_str().unwrap();
        assert_eq!(command_text, result.command_text());
        assert!(command_text.starts_with("a cat --pos a cat --pos_  --neg watermark --neg_ watermark"));
        assert!(command_text.contains("--seed 7 --steps 8 --width 512 --height 512"));
        assert_eq!(workflow["3"]["inputs"]["model"], serde_json::json!(["4", 0]));
    }

    #[test]
    fn test_reparse_of_command_text_is_stable() {
        let (_temp_dir, merger) = merger_with(&[("txt2img", TXT2IMG)]);
        let result = merger.merge_template("a cat --pos_ hq --seed -1 --size 640x480");
        let params = parse_command(&result.command_text(), merger.registry(), None);

        assert_eq!(params.positive, result.fields.text(Field::Pos));
        assert_eq!(params.positive, "a cat, hq");
        assert_eq!(params.negative, result.fields.text(Field::Neg));
        assert_eq!(params.seed, result.fields.integer(Field::Seed));
        assert_eq!(params.steps, 8);
        assert_eq!(params.width, 640);
        assert_eq!(params.height, 480);
        assert_eq!(params.cfg, 4.5);
    }

    #[test]
    fn test_template_size_is_inert() {
        let (_temp_dir, merger) = merger_with(&[(
            "txt2img",
            r#"{"1": {"class_type": "TextCommandParser", "inputs": {"command_text": "--size 768x640 --steps 6"}}}"#,
        )]);

        let result = merger.merge_template("a cat");
        assert_eq!(result.fields.integer(Field::Width), 512);
        assert_eq!(result.fields.integer(Field::Height), 512);
        assert_eq!(result.fields.integer(Field::Steps), 6);

        let result = merger.merge_template("a cat --size 640x480");
        assert_eq!(result.fields.integer(Field::Width), 640);
        assert_eq!(result.fields.integer(Field::Height), 480);
    }

    #[test]
    fn test_template_width_and_height_apply() {
        let (_temp_dir, merger) = merger_with(&[(
            "txt2img",
            r#"{"1": {"class_type": "TextCommandParser", "inputs": {"command_text": "--width 768 --height 640"}}}"#,
        )]);
        let result = merger.merge_template("a cat");
        assert_eq!(result.fields.integer(Field::Width), 768);
        assert_eq!(result.fields.integer(Field::Height), 640);
    }

    #[test]
    fn test_explicit_pos_wins_over_prose() {
        let (_temp_dir, merger) = merger_with(&[("txt2img", TXT2IMG)]);
        let result = merger.merge_template("ignored words --pos a dog");
        assert_eq!(result.fields.text(Field::Pos), "a dog");
        assert_eq!(result.positive, "ignored words");
    }

    #[test]
    fn test_template_pos_kept_without_prose() {
        let (_temp_dir, merger) = merger_with(&[(
            "txt2img",
            r#"{"1": {"class_type": "TextCommandParser", "inputs": {"command_text": "--pos castle --pos_ fog"}}}"#,
        )]);

        let result = merger.merge_template("--steps 3");
        assert_eq!(result.fields.text(Field::Pos), "castle, fog");
        assert!(result.command_text().starts_with("--pos castle, fog --pos_ fog"));

        let result = merger.merge_template("a ship");
        assert_eq!(result.fields.text(Field::Pos), "a ship, fog");
    }

    #[test]
    fn test_named_template_is_selected() {
        let (_temp_dir, merger) = merger_with(&[
            ("txt2img", TXT2IMG),
            (
                "video",
                r#"{"1": {"class_type": "TextCommandParser", "inputs": {"command_text": "--length 120"}}}"#,
            ),
        ]);
        let result = merger.merge_template("video a wave --count 2");
        assert_eq!(result.template, "video");
        assert_eq!(result.positive, "a wave");
        assert_eq!(result.fields.integer(Field::Length), 120);
        assert_eq!(result.fields.integer(Field::Count), 2);
        assert_eq!(result.fields.integer(Field::Steps), 20);
    }

    #[test]
    fn test_missing_template_yields_empty_workflow() {
        let (_temp_dir, merger) = merger_with(&[]);
        let result = merger.merge_template("a cat --steps 5");
        assert_eq!(result.workflow_json(), "{}");
        assert_eq!(result.fields.integer(Field::Steps), 5);
        assert_eq!(result.template, "txt2img");
    }

    #[test]
    fn test_traversal_attempt_stays_in_prompt() {
        let (_temp_dir, merger) = merger_with(&[("txt2img", TXT2IMG)]);
        let result = merger.merge_template("../secret hello");
        assert_eq!(result.template, "txt2img");
        assert_eq!(result.positive, "../secret hello");
    }
}
