//! Recognized override fields and their value types.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// A recognized override key.
///
/// Declaration order is the canonical registry order used whenever a table is
/// serialized back into directive text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Pos,
    PosAppend,
    Neg,
    NegAppend,
    Model,
    Seed,
    Steps,
    Width,
    Height,
    Count,
    Length,
    Cfg,
    File,
    Tokens,
}

impl Field {
    /// Number of recognized fields.
    pub const COUNT: usize = 14;

    /// All fields in registry order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Pos,
        Self::PosAppend,
        Self::Neg,
        Self::NegAppend,
        Self::Model,
        Self::Seed,
        Self::Steps,
        Self::Width,
        Self::Height,
        Self::Count,
        Self::Length,
        Self::Cfg,
        Self::File,
        Self::Tokens,
    ];

    /// Directive key as written by users.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Pos => "pos",
            Self::PosAppend => "pos_",
            Self::Neg => "neg",
            Self::NegAppend => "neg_",
            Self::Model => "model",
            Self::Seed => "seed",
            Self::Steps => "steps",
            Self::Width => "width",
            Self::Height => "height",
            Self::Count => "count",
            Self::Length => "length",
            Self::Cfg => "cfg",
            Self::File => "file",
            Self::Tokens => "tokens",
        }
    }

    /// Look up a field by directive key. Unknown keys return `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Value type of this field.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Pos | Self::PosAppend | Self::Neg | Self::NegAppend | Self::Model | Self::File => {
                FieldKind::Text
            }
            Self::Seed
            | Self::Steps
            | Self::Width
            | Self::Height
            | Self::Count
            | Self::Length
            | Self::Tokens => FieldKind::Integer,
            Self::Cfg => FieldKind::Float,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
        })
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(Cow<'static, str>),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Float(_) => FieldKind::Float,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    /// Formats the value so that the field parser reads it back unchanged.
    ///
    /// Whole floats keep one decimal place (`1.0`, not `1`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A directive value that could not be read as the field's type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot read {raw:?} as {expected}")]
pub struct CoercionError {
    /// Trimmed input that failed to parse.
    pub raw: String,
    /// Type the field requires.
    pub expected: FieldKind,
}

/// Typed parser stored alongside each field's default.
pub type Parser = fn(&str) -> Result<FieldValue, CoercionError>;

/// Accept any text verbatim.
pub(crate) fn parse_text(raw: &str) -> Result<FieldValue, CoercionError> {
    Ok(FieldValue::Text(Cow::Owned(raw.to_owned())))
}

/// Parse a signed decimal integer (surrounding whitespace allowed).
pub(crate) fn parse_integer(raw: &str) -> Result<FieldValue, CoercionError> {
    raw.trim()
        .parse::<i64>()
        .map(FieldValue::Integer)
        .map_err(|_| CoercionError {
            raw: raw.to_owned(),
            expected: FieldKind::Integer,
        })
}

/// Parse a floating point number (surrounding whitespace allowed).
pub(crate) fn parse_float(raw: &str) -> Result<FieldValue, CoercionError> {
    raw.trim()
        .parse::<f64>()
        .map(FieldValue::Float)
        .map_err(|_| CoercionError {
            raw: raw.to_owned(),
            expected: FieldKind::Float,
        })
}
