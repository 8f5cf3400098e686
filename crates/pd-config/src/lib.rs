//! Configuration management for the prompt directive engine.
//!
//! Parses `pd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [templates]
//! dir = "templates"
//! default = "txt2img"
//!
//! [output]
//! root = "${PD_OUTPUT:-output}"
//!
//! [fetch]
//! timeout_secs = 10
//! user_agent = "Mozilla/5.0"
//! max_bytes = 33554432
//!
//! [defaults]
//! steps = 4
//! seed = 0
//! cfg = 1.5
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `templates.dir`
//! - `templates.default`
//! - `output.root`
//! - `fetch.user_agent`
//! - text values in `[defaults]`

mod expand;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pd_directive::{FetchSettings, Registry, RegistryError};
use pd_template::is_plain_name;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override fallback template name.
    pub default_template: Option<String>,
    /// Override output root.
    pub output_root: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pd.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template configuration (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Network settings for `--file` URLs.
    pub fetch: FetchConfig,
    /// Replacement field defaults, keyed by directive key.
    pub defaults: BTreeMap<String, DefaultValue>,

    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw template configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
    default: Option<String>,
}

/// Resolved template configuration.
#[derive(Debug, Default)]
pub struct TemplatesConfig {
    /// Directory holding `<name>.json` workflow templates.
    pub dir: PathBuf,
    /// Template used when the prompt does not name one.
    pub default: String,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    root: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Root directory all outputs are confined to.
    pub root: PathBuf,
}

/// Network settings for `--file` URL fetches.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Maximum accepted body size in bytes.
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: pd_directive::DEFAULT_TIMEOUT,
            user_agent: pd_directive::DEFAULT_USER_AGENT.to_owned(),
            max_bytes: pd_directive::DEFAULT_MAX_BYTES,
        }
    }
}

impl FetchConfig {
    /// Settings for the file resolver.
    #[must_use]
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

/// A configured field default, written as a TOML scalar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Invalid entry in `[defaults]`.
    #[error("Configuration error: {0}")]
    Defaults(#[from] RegistryError),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.root`").
        field: String,
        /// Error message (e.g., "${`PD_OUTPUT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a name to be a single plain path component.
fn require_plain_name(value: &str, field: &str) -> Result<(), ConfigError> {
    if !is_plain_name(value) {
        return Err(ConfigError::Validation(format!(
            "{field} must be a plain file name, got {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the loaded values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.templates_dir {
            self.templates_resolved.dir.clone_from(dir);
        }
        if let Some(name) = &settings.default_template {
            self.templates_resolved.default.clone_from(name);
        }
        if let Some(root) = &settings.output_root {
            self.output_resolved.root.clone_from(root);
        }
    }

    /// Field defaults with the `[defaults]` overrides applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Defaults` for unknown keys or values that do not
    /// parse as the field's type.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let rendered: Vec<(&str, String)> = self
            .defaults
            .iter()
            .map(|(key, value)| (key.as_str(), value.to_string()))
            .collect();
        let registry =
            Registry::with_overrides(rendered.iter().map(|(key, raw)| (*key, raw.as_str())))?;
        Ok(registry)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            templates: TemplatesConfigRaw::default(),
            output: OutputConfigRaw::default(),
            fetch: FetchConfig::default(),
            defaults: BTreeMap::new(),
            templates_resolved: TemplatesConfig {
                dir: base.join("templates"),
                default: "txt2img".to_owned(),
            },
            output_resolved: OutputConfig {
                root: base.join("output"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` or `ConfigError::Defaults` if any
    /// validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_templates()?;
        self.validate_fetch()?;
        self.registry()?;
        Ok(())
    }

    fn validate_templates(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.templates_resolved.default, "templates.default")?;
        require_plain_name(&self.templates_resolved.default, "templates.default")?;
        Ok(())
    }

    fn validate_fetch(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.fetch.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "fetch.max_bytes must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.fetch.user_agent, "fetch.user_agent")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.templates.dir {
            self.templates.dir = Some(expand::expand_env(dir, "templates.dir")?);
        }
        if let Some(ref name) = self.templates.default {
            self.templates.default = Some(expand::expand_env(name, "templates.default")?);
        }
        if let Some(ref root) = self.output.root {
            self.output.root = Some(expand::expand_env(root, "output.root")?);
        }
        self.fetch.user_agent = expand::expand_env(&self.fetch.user_agent, "fetch.user_agent")?;

        for (key, value) in &mut self.defaults {
            if let DefaultValue::Text(text) = value {
                *text = expand::expand_env(text, &format!("defaults.{key}"))?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.templates_resolved = TemplatesConfig {
            dir: resolve(self.templates.dir.as_deref(), "templates"),
            default: self
                .templates
                .default
                .clone()
                .unwrap_or_else(|| "txt2img".to_owned()),
        };
        self.output_resolved = OutputConfig {
            root: resolve(self.output.root.as_deref(), "output"),
        };
    }
}
