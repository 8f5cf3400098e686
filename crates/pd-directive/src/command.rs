//! Standalone command parsing.
//!
//! Turns a single command text straight into generation parameters, the way a
//! workflow node receiving the reconstructed `command_text` does. Unlike
//! template merging, this path also resolves the `file` field into a base64
//! payload.

use serde::Serialize;

use crate::field::Field;
use crate::merge::merge;
use crate::registry::Registry;
use crate::resolver::FileResolver;
use crate::table::FieldTable;
use crate::tokenizer::tokenize;

/// Generation parameters produced from one command text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub positive: String,
    pub negative: String,
    pub model: String,
    pub seed: i64,
    pub steps: i64,
    pub width: i64,
    pub height: i64,
    pub count: i64,
    pub length: i64,
    pub cfg: f64,
    /// Resolved `file` payload (base64), or the raw `file` value when no
    /// resolver was supplied.
    pub base64_data: String,
    pub tokens: i64,
}

impl GenerationParams {
    /// Collect parameters from a merged table.
    #[must_use]
    pub fn from_table(table: &FieldTable, base64_data: String) -> Self {
        Self {
            positive: table.text(Field::Pos).to_owned(),
            negative: table.text(Field::Neg).to_owned(),
            model: table.text(Field::Model).to_owned(),
            seed: table.integer(Field::Seed),
            steps: table.integer(Field::Steps),
            width: table.integer(Field::Width),
            height: table.integer(Field::Height),
            count: table.integer(Field::Count),
            length: table.integer(Field::Length),
            cfg: table.float(Field::Cfg),
            base64_data,
            tokens: table.integer(Field::Tokens),
        }
    }
}

/// Parse `text` into generation parameters.
///
/// Non-empty directive-free text becomes the positive prompt; an explicit
/// `--pos` replaces it and `--pos_` appends to it. When `resolver` is given, the
/// final `file` value is resolved to base64 (empty on failure).
///
/// # Example
///
/// ```
/// use pd_directive::{Registry, parse_command};
///
/// let params = parse_command("a cat --steps 30 --neg_ blurry", &Registry::standard(), None);
/// assert_eq!(params.positive, "a cat");
/// assert_eq!(params.negative, "blurry");
/// assert_eq!(params.steps, 30);
/// ```
#[must_use]
pub fn parse_command(
    text: &str,
    registry: &Registry,
    resolver: Option<&FileResolver>,
) -> GenerationParams {
    let tokens = tokenize(text);
    let mut base = registry.table();
    if !tokens.residual.is_empty() {
        base.set_text(Field::Pos, tokens.residual);
    }
    let table = merge(&base, &tokens.directives);

    let file = table.text(Field::File);
    let base64_data = match resolver {
        Some(resolver) => resolver.resolve(file),
        None => file.to_owned(),
    };

    GenerationParams::from_table(&table, base64_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MAX_SEED;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_residual_becomes_positive() {
        let params = parse_command("a cat --steps 30 --seed -1", &Registry::standard(), None);
        assert_eq!(params.positive, "a cat");
        assert_eq!(params.steps, 30);
        assert!((0..=MAX_SEED).contains(&params.seed));
    }

    #[test]
    fn test_explicit_pos_replaces_residual() {
        let params = parse_command("ignored --pos a dog", &Registry::standard(), None);
        assert_eq!(params.positive, "a dog");
    }

    #[test]
    fn test_append_fields() {
        let params = parse_command(
            "portrait --pos_ sharp focus --neg bad hands --neg_ lowres",
            &Registry::standard(),
            None,
        );
        assert_eq!(params.positive, "portrait, sharp focus");
        assert_eq!(params.negative, "bad hands, lowres");
    }

    #[test]
    fn test_defaults_from_registry() {
        let registry = Registry::with_overrides([("steps", "4"), ("seed", "0")]).unwrap();
        let params = parse_command("just text", &registry, None);
        assert_eq!(params.steps, 4);
        assert_eq!(params.seed, 0);
        assert_eq!(params.cfg, 1.0);
        assert_eq!(params.width, 512);
        assert_eq!(params.tokens, 512);
    }

    #[test]
    fn test_configured_pos_kept_without_prose() {
        let registry = Registry::with_overrides([("pos", "castle")]).unwrap();
        assert_eq!(parse_command("--steps 3", &registry, None).positive, "castle");
        assert_eq!(parse_command("a ship", &registry, None).positive, "a ship");
    }

    #[test]
    fn test_file_passes_through_without_resolver() {
        let params = parse_command("--file aGVsbG8=", &Registry::standard(), None);
        assert_eq!(params.base64_data, "aGVsbG8=");
    }

    #[test]
    fn test_file_is_resolved_with_resolver() {
        let resolver = FileResolver::default();
        let params = parse_command("x --file aGVsbG8=", &Registry::standard(), Some(&resolver));
        assert_eq!(params.base64_data, "aGVsbG8=");

        let params = parse_command("x --file not base64!", &Registry::standard(), Some(&resolver));
        assert_eq!(params.base64_data, "");
    }

    #[test]
    fn test_reconstructed_text_parses_to_same_values() {
        let registry = Registry::standard();
        let first = parse_command(
            "a cat --pos_ hq --neg noisy --steps 8 --cfg 6.5 --seed 99 --size 640x480",
            &registry,
            None,
        );

        let mut table = registry.table();
        let tokens =
            tokenize("a cat --pos_ hq --neg noisy --steps 8 --cfg 6.5 --seed 99 --size 640x480");
        table.set_text(Field::Pos, tokens.residual);
        let table = merge(&table, &tokens.directives);

        let again = parse_command(&table.to_directive_text(), &registry, None);
        assert_eq!(again, first);
        assert_eq!(again.positive, "a cat, hq");
        assert_eq!(again.width, 640);
    }

    #[test]
    fn test_serializes_output_record() {
        let params = parse_command("x --seed 1", &Registry::standard(), None);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["positive"], "x");
        assert_eq!(json["seed"], 1);
        assert_eq!(json["base64_data"], "");
    }
}
