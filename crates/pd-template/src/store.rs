//! Template lookup on disk.
//!
//! Templates live as `<dir>/<name>.json`. A prompt may start with a template
//! name; only plain names that map to an existing file are honored, so a
//! leading word like `../secret` can never reach outside the directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::TemplateDocument;

/// Template used when the prompt does not name one.
pub const DEFAULT_TEMPLATE: &str = "txt2img";

/// File extension of template files.
pub const TEMPLATE_EXTENSION: &str = "json";

/// Why a template could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The name is not a plain file name.
    #[error("invalid template name: {0:?}")]
    InvalidName(String),

    /// File missing or unreadable.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Top-level JSON value is not an object.
    #[error("{} is not a JSON object", .0.display())]
    NotAnObject(PathBuf),
}

/// Outcome of template selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected template name (without extension).
    pub name: String,
    /// Prompt with the template name removed, or the original prompt when
    /// the default template was selected.
    pub prompt: String,
}

/// Directory of workflow templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
    default_name: String,
}

impl TemplateStore {
    /// Store rooted at `dir` with [`DEFAULT_TEMPLATE`] as fallback.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_name: DEFAULT_TEMPLATE.to_owned(),
        }
    }

    /// Use `name` as the fallback template.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Template directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fallback template name.
    #[must_use]
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Path of the template called `name`, if `name` is a plain file name.
    #[must_use]
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        is_plain_name(name).then(|| self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }

    /// Pick the template named by the prompt's first word, if any.
    ///
    /// The first word is taken as a template name only when it is a plain
    /// file name and the template file exists. Otherwise the fallback
    /// template is selected and the prompt is returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use pd_template::TemplateStore;
    ///
    /// let store = TemplateStore::new("/nonexistent");
    /// let selection = store.select("../secret hello");
    /// assert_eq!(selection.name, "txt2img");
    /// assert_eq!(selection.prompt, "../secret hello");
    /// ```
    #[must_use]
    pub fn select(&self, prompt: &str) -> Selection {
        let trimmed = prompt.trim_start();
        if let Some(candidate) = trimmed.split_whitespace().next()
            && let Some(path) = self.path_for(candidate)
            && path.is_file()
        {
            debug!("selected template {candidate}");
            return Selection {
                name: candidate.to_owned(),
                prompt: trimmed[candidate.len()..].trim_start().to_owned(),
            };
        }

        Selection {
            name: self.default_name.clone(),
            prompt: prompt.to_owned(),
        }
    }

    /// Load the template called `name`, or an empty document on failure.
    #[must_use]
    pub fn load(&self, name: &str) -> TemplateDocument {
        self.try_load(name).unwrap_or_else(|err| {
            warn!("using empty template: {err}");
            TemplateDocument::default()
        })
    }

    /// Load the template called `name`.
    ///
    /// # Errors
    ///
    /// See [`TemplateError`].
    pub fn try_load(&self, name: &str) -> Result<TemplateDocument, TemplateError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| TemplateError::InvalidName(name.to_owned()))?;

        let content = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| TemplateError::Json {
            path: path.clone(),
            source,
        })?;

        match value {
            Value::Object(nodes) => Ok(TemplateDocument::new(nodes)),
            _ => Err(TemplateError::NotAnObject(path)),
        }
    }
}

/// Whether `name` is a single, ordinary path component.
///
/// Rejects empty names, `.`, `..`, and anything containing a `/` or `\`
/// separator on any platform.
#[must_use]
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name() == Some(OsStr::new(name))
}
