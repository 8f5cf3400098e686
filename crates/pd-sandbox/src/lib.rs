//! Sandboxed output paths.
//!
//! Everything written on behalf of a prompt goes through an
//! [`OutputSandbox`]: caller-supplied names are confined to a single root and
//! new files never replace existing ones.
//!
//! # Example
//!
//! ```no_run
//! use pd_sandbox::OutputSandbox;
//!
//! let sandbox = OutputSandbox::new("output")?;
//! let now = chrono::Local::now().naive_local();
//! let saved = sandbox.save_texts("captions/run", &["a cat on a mat"], now)?;
//! assert_eq!(saved[0].subfolder, "captions");
//! # Ok::<(), pd_sandbox::SandboxError>(())
//! ```

use std::path::PathBuf;

mod confine;
mod save;
mod unique;

pub use confine::OutputSandbox;
pub use save::{DEFAULT_TEXT_EXTENSION, SavedOutput, TIMESTAMP_FORMAT, output_path};
pub use unique::{allocate_unique, create_unique};

/// Output path error.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Path would leave the output root.
    #[error("path {} escapes output root {}", path.display(), root.display())]
    PathViolation { path: PathBuf, root: PathBuf },

    /// I/O error while creating directories or files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
