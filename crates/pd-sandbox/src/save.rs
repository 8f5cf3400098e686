//! Saving generated text inside the output root.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::SandboxError;
use crate::confine::OutputSandbox;
use crate::unique::create_unique;

/// Extension used when the prefix has none.
pub const DEFAULT_TEXT_EXTENSION: &str = "txt";

/// Timestamp layout embedded in output file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Description of one saved file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedOutput {
    /// File name without directories.
    pub filename: String,
    /// Directory of the file relative to the output root, `/`-separated;
    /// empty for the root itself.
    pub subfolder: String,
    /// Always `"output"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Name of the `index`th file written for `prefix` at `now`:
/// `<prefix>_<timestamp>_<index><ext>`.
///
/// The extension comes from `prefix` when it has one, `.txt` otherwise.
#[must_use]
pub fn output_path(prefix: &Path, now: NaiveDateTime, index: usize) -> PathBuf {
    let stem = prefix.file_stem().unwrap_or_default().to_string_lossy();
    let ext = prefix
        .extension()
        .map_or_else(|| DEFAULT_TEXT_EXTENSION.into(), |ext| ext.to_string_lossy());
    let timestamp = now.format(TIMESTAMP_FORMAT);
    prefix.with_file_name(format!("{stem}_{timestamp}_{index}.{ext}"))
}

impl OutputSandbox {
    /// Write each of `texts` to its own file named after `prefix`.
    ///
    /// `prefix` is confined to the root first. Files are created with
    /// [`create_unique`], so existing outputs are never overwritten. Missing
    /// parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::PathViolation`] if the prefix escapes the root
    /// (or names the root itself) and [`SandboxError::Io`] on write failure.
    pub fn save_texts<S: AsRef<str>>(
        &self,
        prefix: &str,
        texts: &[S],
        now: NaiveDateTime,
    ) -> Result<Vec<SavedOutput>, SandboxError> {
        let base = self.confine(prefix)?;
        if base == self.root() {
            return Err(SandboxError::PathViolation {
                path: PathBuf::from(prefix),
                root: self.root().to_path_buf(),
            });
        }

        let mut saved = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let target = output_path(&base, now, index);
            let dir = target.parent().unwrap_or(self.root());
            std::fs::create_dir_all(dir)?;

            let (path, mut file) = create_unique(&target)?;
            file.write_all(text.as_ref().as_bytes())?;
            debug!("saved text to {}", path.display());

            saved.push(self.describe(&path));
        }
        Ok(saved)
    }

    fn describe(&self, path: &Path) -> SavedOutput {
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let subfolder = path
            .parent()
            .and_then(|dir| dir.strip_prefix(self.root()).ok())
            .map(|dir| {
                dir.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();

        SavedOutput {
            filename,
            subfolder,
            kind: "output",
        }
    }
}
