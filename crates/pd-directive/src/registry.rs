//! Field catalog and default values.
//!
//! [`CATALOG`] is the fixed list of recognized fields, each with its built-in
//! default and typed parser. A [`Registry`] is an immutable set of defaults
//! derived from the catalog, optionally with deployment-specific overrides,
//! from which fresh [`FieldTable`]s are seeded for every request.

use std::borrow::Cow;

use crate::field::{
    CoercionError, Field, FieldValue, Parser, parse_float, parse_integer, parse_text,
};
use crate::table::FieldTable;

/// Seed value meaning "pick a random seed".
pub const SEED_SENTINEL: i64 = -1;

/// Catalog entry for one recognized field.
#[derive(Debug)]
pub struct FieldSpec {
    /// Field identity.
    pub field: Field,
    /// Built-in default, always of the field's kind.
    pub default: FieldValue,
    /// Parser coercing directive text into the field's kind.
    pub parse: Parser,
}

const fn text(field: Field, default: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        default: FieldValue::Text(Cow::Borrowed(default)),
        parse: parse_text,
    }
}

const fn integer(field: Field, default: i64) -> FieldSpec {
    FieldSpec {
        field,
        default: FieldValue::Integer(default),
        parse: parse_integer,
    }
}

const fn float(field: Field, default: f64) -> FieldSpec {
    FieldSpec {
        field,
        default: FieldValue::Float(default),
        parse: parse_float,
    }
}

/// Recognized fields in registry order.
pub static CATALOG: [FieldSpec; Field::COUNT] = [
    text(Field::Pos, ""),
    text(Field::PosAppend, ""),
    text(Field::Neg, ""),
    text(Field::NegAppend, ""),
    text(Field::Model, ""),
    integer(Field::Seed, SEED_SENTINEL),
    integer(Field::Steps, 20),
    integer(Field::Width, 512),
    integer(Field::Height, 512),
    integer(Field::Count, 1),
    integer(Field::Length, 80),
    float(Field::Cfg, 1.0),
    text(Field::File, ""),
    integer(Field::Tokens, 512),
];

/// Catalog entry for `field`.
#[must_use]
pub fn spec(field: Field) -> &'static FieldSpec {
    &CATALOG[field.index()]
}

/// Error building a registry from configured defaults.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The configured key is not a recognized field.
    #[error("unknown field `{0}` in defaults")]
    UnknownField(String),

    /// The configured value does not parse as the field's type.
    #[error("invalid default for `{field}`: {source}")]
    InvalidDefault {
        field: Field,
        #[source]
        source: CoercionError,
    },
}

/// Immutable defaults for one deployment.
///
/// Cloning is cheap enough to do per request, but the usual pattern is to
/// build one registry at startup and share it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    defaults: FieldTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Registry with the built-in catalog defaults.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            defaults: FieldTable::from_catalog(),
        }
    }

    /// Registry with selected defaults replaced.
    ///
    /// Each override is written as directive text (`"4"`, `"7.5"`, ...) and
    /// read through the field's own parser. Unlike user directives, a bad
    /// override is an error: defaults come from trusted configuration and a
    /// typo there should stop startup.
    ///
    /// # Example
    ///
    /// ```
    /// use pd_directive::{Field, Registry};
    ///
    /// let registry = Registry::with_overrides([("steps", "4"), ("cfg", "2")]).unwrap();
    /// assert_eq!(registry.table().integer(Field::Steps), 4);
    /// assert!(Registry::with_overrides([("steps", "many")]).is_err());
    /// ```
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut defaults = FieldTable::from_catalog();
        for (key, raw) in overrides {
            let field =
                Field::from_key(key).ok_or_else(|| RegistryError::UnknownField(key.to_owned()))?;
            defaults
                .apply(field, raw.trim())
                .map_err(|source| RegistryError::InvalidDefault { field, source })?;
        }
        Ok(Self { defaults })
    }

    /// Fresh table seeded with this registry's defaults.
    #[must_use]
    pub fn table(&self) -> FieldTable {
        self.defaults.clone()
    }

    /// Default value of `field`.
    #[must_use]
    pub fn default_value(&self, field: Field) -> &FieldValue {
        self.defaults.get(field)
    }
}
