//! Resolution of the `file` directive into a base64 payload.
//!
//! The value of `--file` may be:
//!
//! - an `http://` or `https://` URL pointing at an image,
//! - a path to an existing local file,
//! - a raw base64 string.
//!
//! [`FileResolver::resolve`] never fails: any problem is logged and resolves
//! to an empty string. Use [`FileResolver::try_resolve`] to see the cause.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::BASE64_STANDARD;
use tracing::{debug, warn};
use ureq::Agent;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Default `User-Agent` sent with URL fetches.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default upper bound for downloaded bodies (32 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 32 * 1024 * 1024;

/// Strict validator: standard alphabet, canonical padding required, but
/// non-zero trailing bits accepted.
const VALIDATOR: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Network settings for URL fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Overall timeout for one fetch.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Maximum accepted body size in bytes.
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Why a `file` value could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Network error, timeout, or oversized body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Response was not an image.
    #[error("URL does not point to an image (content type {0:?})")]
    NotAnImage(String),

    /// Local file exists but could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Value is neither a URL, an existing path, nor valid base64.
    #[error("value is not valid base64")]
    InvalidBase64(#[source] base64::DecodeError),
}

/// Resolves `file` values to base64 payloads.
///
/// Cloning is cheap: clones share the underlying HTTP agent.
#[derive(Clone)]
pub struct FileResolver {
    agent: Agent,
    user_agent: String,
    max_bytes: u64,
}

impl std::fmt::Debug for FileResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileResolver")
            .field("user_agent", &self.user_agent)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl Default for FileResolver {
    fn default() -> Self {
        Self::new(&FetchSettings::default())
    }
}

impl FileResolver {
    /// Create a resolver with the given network settings.
    #[must_use]
    pub fn new(settings: &FetchSettings) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            user_agent: settings.user_agent.clone(),
            max_bytes: settings.max_bytes,
        }
    }

    /// Resolve `value` to base64, or `""` on any failure.
    ///
    /// Blocks for up to the configured timeout when `value` is a URL; see
    /// [`spawn_resolve`](Self::spawn_resolve) for a non-blocking variant.
    #[must_use]
    pub fn resolve(&self, value: &str) -> String {
        match self.try_resolve(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to resolve --file value: {err}");
                String::new()
            }
        }
    }

    /// Run [`resolve`](Self::resolve) on a worker thread.
    ///
    /// The fetch runs to completion or timeout; dropping the handle does not
    /// cancel it.
    #[must_use]
    pub fn spawn_resolve(&self, value: String) -> JoinHandle<String> {
        let resolver = self.clone();
        thread::spawn(move || resolver.resolve(&value))
    }

    /// Resolve `value`, reporting why resolution failed.
    ///
    /// An empty value resolves to an empty payload.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`] for the failure cases.
    pub fn try_resolve(&self, value: &str) -> Result<String, ResolveError> {
        if value.is_empty() {
            return Ok(String::new());
        }

        if value.starts_with("http://") || value.starts_with("https://") {
            let bytes = self.fetch_image(value)?;
            return Ok(BASE64_STANDARD.encode(bytes));
        }

        let path = Path::new(value);
        if path.exists() {
            debug!("reading --file from {}", path.display());
            let bytes = std::fs::read(path)?;
            return Ok(BASE64_STANDARD.encode(bytes));
        }

        VALIDATOR
            .decode(value)
            .map_err(ResolveError::InvalidBase64)?;
        Ok(value.to_owned())
    }

    /// GET `url` and return the body if it is an image.
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ResolveError> {
        debug!("fetching --file from {url}");

        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !content_type.contains("image") {
            return Err(ResolveError::NotAnImage(content_type));
        }

        Ok(response
            .body_mut()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()?)
    }
}
