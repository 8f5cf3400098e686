//! Working set of field values for one parse or merge.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::field::{CoercionError, Field, FieldValue};
use crate::registry::{CATALOG, spec};

/// Current value of every recognized field.
///
/// Every entry always holds a value of its field's kind: the only ways to
/// change an entry are [`apply`](Self::apply), which runs the field's parser
/// and leaves the entry untouched on failure, and the kind-checked setters.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    values: [FieldValue; Field::COUNT],
}

impl FieldTable {
    pub(crate) fn from_catalog() -> Self {
        Self {
            values: std::array::from_fn(|i| CATALOG[i].default.clone()),
        }
    }

    /// Current value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &FieldValue {
        &self.values[field.index()]
    }

    /// Text value of `field`, or `""` for non-text fields.
    #[must_use]
    pub fn text(&self, field: Field) -> &str {
        self.get(field).as_text().unwrap_or_default()
    }

    /// Integer value of `field`, or `0` for non-integer fields.
    #[must_use]
    pub fn integer(&self, field: Field) -> i64 {
        self.get(field).as_integer().unwrap_or_default()
    }

    /// Float value of `field`, or `0.0` for non-float fields.
    #[must_use]
    pub fn float(&self, field: Field) -> f64 {
        self.get(field).as_float().unwrap_or_default()
    }

    /// Parse `raw` with the field's parser and store the result.
    ///
    /// # Errors
    ///
    /// Returns the [`CoercionError`] and keeps the previous value when `raw`
    /// does not parse.
    pub fn apply(&mut self, field: Field, raw: &str) -> Result<(), CoercionError> {
        let value = (spec(field).parse)(raw)?;
        self.values[field.index()] = value;
        Ok(())
    }

    /// Replace a text field. Returns `false` (and changes nothing) for
    /// fields of another kind.
    pub fn set_text(&mut self, field: Field, text: impl Into<String>) -> bool {
        self.set(field, FieldValue::Text(Cow::Owned(text.into())))
    }

    /// Replace an integer field. Returns `false` (and changes nothing) for
    /// fields of another kind.
    pub fn set_integer(&mut self, field: Field, value: i64) -> bool {
        self.set(field, FieldValue::Integer(value))
    }

    fn set(&mut self, field: Field, value: FieldValue) -> bool {
        if value.kind() != field.kind() {
            return false;
        }
        self.values[field.index()] = value;
        true
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ALL.into_iter().zip(self.values.iter())
    }

    /// Render every entry as `--key value`, in registry order, joined by
    /// spaces. Unchanged defaults are included.
    ///
    /// Tokenizing and merging the result reproduces this table as long as no
    /// text value contains a directive delimiter.
    #[must_use]
    pub fn to_directive_text(&self) -> String {
        self.iter()
            .map(|(field, value)| format!("--{} {value}", field.key()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for FieldTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}
