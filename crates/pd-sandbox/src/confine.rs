//! Confinement of output paths to a single root directory.

use std::path::{Component, Path, PathBuf};

use crate::SandboxError;

/// An output root that every written path must stay inside.
///
/// Confinement is lexical: `..` components are resolved against the path
/// itself, never against the filesystem, so it works for paths that do not
/// exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSandbox {
    root: PathBuf,
}

impl OutputSandbox {
    /// Sandbox rooted at `root`, made absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Io`] if the current directory is needed and
    /// cannot be determined.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root = std::path::absolute(root.as_ref())?;
        Ok(Self {
            root: normalize(&root),
        })
    }

    /// Absolute, normalized root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `candidate` to an absolute path inside the root.
    ///
    /// Backslashes are read as separators. A candidate that is not already
    /// under the root is placed under it with any leading `/` dropped, so
    /// `images/cat` and `/images/cat` both land in `<root>/images/cat`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::PathViolation`] when `..` components would
    /// leave the root.
    ///
    /// # Example
    ///
    /// ```
    /// use pd_sandbox::OutputSandbox;
    ///
    /// let sandbox = OutputSandbox::new("/srv/output").unwrap();
    /// assert_eq!(
    ///     sandbox.confine("texts/./notes").unwrap(),
    ///     std::path::Path::new("/srv/output/texts/notes"),
    /// );
    /// assert!(sandbox.confine("../etc/passwd").is_err());
    /// ```
    pub fn confine(&self, candidate: impl AsRef<Path>) -> Result<PathBuf, SandboxError> {
        let original = candidate.as_ref();
        let unified = original.to_string_lossy().replace('\\', "/");
        let candidate = Path::new(&unified);

        let normalized = normalize(candidate);
        let joined = if candidate.has_root() && normalized.starts_with(&self.root) {
            normalized
        } else {
            let relative: PathBuf = candidate
                .components()
                .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
                .collect();
            self.root.join(relative)
        };

        let confined = normalize(&joined);
        if !confined.starts_with(&self.root) {
            return Err(SandboxError::PathViolation {
                path: original.to_path_buf(),
                root: self.root.clone(),
            });
        }
        Ok(confined)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the filesystem root stays at the root.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
