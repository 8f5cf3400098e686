//! Workflow templates driven by prompt directives.
//!
//! A prompt may start with the name of a stored JSON workflow. The selected
//! template's anchor node (`class_type` `TextCommandParser`) supplies default
//! directives; the user's directives are merged on top and the combined
//! state is written back into the anchor as directive text.
//!
//! # Example
//!
//! ```no_run
//! use pd_directive::{Field, Registry};
//! use pd_template::{TemplateMerger, TemplateStore};
//!
//! let merger = TemplateMerger::new(TemplateStore::new("templates"), Registry::standard());
//! let result = merger.merge_template("img2img a cat --steps 30");
//! assert_eq!(result.fields.integer(Field::Steps), 30);
//! println!("{}", result.workflow_json());
//! ```

mod chat;
mod document;
mod merger;
mod store;

pub use chat::{extract_prompt, extract_prompt_from_str};
pub use document::{ANCHOR_CLASS, COMMAND_TEXT_INPUT, TemplateDocument};
pub use merger::{TemplateMerge, TemplateMerger};
pub use store::{
    DEFAULT_TEMPLATE, Selection, TEMPLATE_EXTENSION, TemplateError, TemplateStore, is_plain_name,
};
