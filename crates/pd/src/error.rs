//! CLI error types.

use pd_config::ConfigError;
use pd_sandbox::SandboxError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sandbox(#[from] SandboxError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
