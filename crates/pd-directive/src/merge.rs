//! Applying directives onto a field table.
//!
//! A merge is lenient by construction: unknown keys are ignored and values
//! that do not coerce are dropped, so malformed input can never prevent a
//! prompt from being produced. After the per-key pass, composite fields are
//! resolved in a fixed order: append fields, `size`, then the random seed.

use rand::RngExt;
use tracing::debug;

use crate::field::Field;
use crate::registry::SEED_SENTINEL;
use crate::table::FieldTable;
use crate::tokenizer::Directive;

/// Largest seed produced when resolving [`SEED_SENTINEL`].
pub const MAX_SEED: i64 = (1 << 31) - 1;

/// Directive key for the joint width/height override.
pub const SIZE_KEY: &str = "size";

/// Merge `directives` onto a copy of `base`.
///
/// When a key repeats, only its last occurrence is considered, even if that
/// occurrence later fails to coerce.
///
/// # Example
///
/// ```
/// use pd_directive::{Field, Registry, merge, tokenize};
///
/// let tokens = tokenize("--steps 30 --size 640x480 --steps=oops --bogus 1");
/// let table = merge(&Registry::standard().table(), &tokens.directives);
/// assert_eq!(table.integer(Field::Steps), 20);
/// assert_eq!(table.integer(Field::Width), 640);
/// assert_eq!(table.integer(Field::Height), 480);
/// ```
#[must_use]
pub fn merge(base: &FieldTable, directives: &[Directive]) -> FieldTable {
    let mut table = base.clone();

    for directive in last_occurrences(directives) {
        let Some(field) = Field::from_key(&directive.key) else {
            continue;
        };
        if let Err(err) = table.apply(field, directive.value_str()) {
            debug!("ignoring --{}: {err}", directive.key);
        }
    }

    fold_append(&mut table, Field::Pos, Field::PosAppend);
    fold_append(&mut table, Field::Neg, Field::NegAppend);

    if let Some(size) = last_occurrences(directives).find(|d| d.key == SIZE_KEY) {
        apply_size(&mut table, size.value_str());
    }

    resolve_seed(&mut table);
    table
}

/// Directives whose key does not occur again later in the slice.
fn last_occurrences(directives: &[Directive]) -> impl Iterator<Item = &Directive> {
    directives.iter().enumerate().filter_map(|(i, directive)| {
        let repeated = directives[i + 1..].iter().any(|d| d.key == directive.key);
        (!repeated).then_some(directive)
    })
}

/// Append `extra` onto `target` as `"target, extra"`.
///
/// Folding is idempotent: when `target` already ends with the appended text
/// it is left alone, so merging a table's own directive text again (or
/// running a second pass that keeps the same append value) never duplicates
/// the suffix.
fn fold_append(table: &mut FieldTable, target: Field, append: Field) {
    let extra = table.text(append);
    if extra.is_empty() {
        return;
    }
    let current = table.text(target);
    if current == extra || current.ends_with(&format!(", {extra}")) {
        return;
    }

    let joined = format!("{current}, {extra}");
    let joined = joined.trim_matches([',', ' ']).to_owned();
    table.set_text(target, joined);
}

/// Parse `<width>x<height>` (case-insensitive) into the size fields.
fn apply_size(table: &mut FieldTable, raw: &str) {
    match parse_size(raw) {
        Some((width, height)) => {
            table.set_integer(Field::Width, width);
            table.set_integer(Field::Height, height);
        }
        None => debug!("ignoring --{SIZE_KEY}: cannot read {raw:?} as WIDTHxHEIGHT"),
    }
}

pub(crate) fn parse_size(raw: &str) -> Option<(i64, i64)> {
    let lowered = raw.to_lowercase();
    let (width, height) = lowered.split_once('x')?;
    if height.contains('x') {
        return None;
    }
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

/// Replace the seed sentinel with a random seed in `[0, MAX_SEED]`.
fn resolve_seed(table: &mut FieldTable) {
    if table.integer(Field::Seed) == SEED_SENTINEL {
        let seed = rand::rng().random_range(0..=MAX_SEED);
        table.set_integer(Field::Seed, seed);
    }
}
