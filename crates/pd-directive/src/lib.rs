//! Inline prompt directives.
//!
//! Users steer generation by embedding directives such as `--steps 30` or
//! `--size 640x480` in free-form prompt text. This crate provides:
//!
//! - [`tokenize`]: a single-pass scanner returning the directives found and
//!   the directive-free residual text
//! - [`Registry`]: the fixed catalog of recognized fields with typed defaults
//! - [`merge`]: lenient application of directives onto a [`FieldTable`],
//!   followed by append folding, `size` splitting and seed randomization
//! - [`parse_command`]: the standalone entry point producing
//!   [`GenerationParams`], optionally resolving `--file` through a
//!   [`FileResolver`]
//!
//! # Example
//!
//! ```
//! use pd_directive::{Field, Registry, merge, tokenize};
//!
//! let tokens = tokenize("a red fox --steps 30 --size 640x480 --bogus 5");
//! assert_eq!(tokens.residual, "a red fox");
//!
//! let table = merge(&Registry::standard().table(), &tokens.directives);
//! assert_eq!(table.integer(Field::Steps), 30);
//! assert_eq!(table.integer(Field::Width), 640);
//! assert_eq!(table.integer(Field::Height), 480);
//! ```

mod command;
mod field;
mod merge;
mod registry;
mod resolver;
mod table;
mod tokenizer;

pub use command::{GenerationParams, parse_command};
pub use field::{CoercionError, Field, FieldKind, FieldValue, Parser};
pub use merge::{MAX_SEED, SIZE_KEY, merge};
pub use registry::{CATALOG, FieldSpec, Registry, RegistryError, SEED_SENTINEL, spec};
pub use resolver::{
    DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FetchSettings, FileResolver,
    ResolveError,
};
pub use table::FieldTable;
pub use tokenizer::{Directive, Tokenized, tokenize};
