//! Configuration loading and resolution
//!
//! Bootstrap configuration comes from a TOML file. Resolution priority:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (bound to the CLI flags)
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! A missing TOML file is not an error: the built-in defaults are used and
//! the returned [`ConfigSource`] says so. Configuration is loaded before
//! logging is initialized, so callers log the source once the subscriber
//! is installed. A file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Backend endpoints
    #[serde(default)]
    pub backend: BackendConfig,

    /// Bulk import pacing
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the marketplace backend, e.g. `http://127.0.0.1:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the item creation endpoint
    #[serde(default = "default_add_item_path")]
    pub add_item_path: String,

    /// Path fetched to refresh the item listing after a successful import
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// CSRF token sent as `X-CSRFToken`
    #[serde(default)]
    pub csrf_token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Bulk import pacing settings
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Pause after the backend reports an item already existed
    #[serde(default = "default_skip_delay_ms")]
    pub skip_delay_ms: u64,

    /// Pause after a created item or a failed submission
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Batches larger than this require operator confirmation
    #[serde(default = "default_confirm_threshold")]
    pub confirm_threshold: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_add_item_path() -> String {
    "/api/add-item/".to_string()
}

fn default_listing_path() -> String {
    "/".to_string()
}

fn default_user_agent() -> String {
    format!("wowm/{}", env!("CARGO_PKG_VERSION"))
}

fn default_skip_delay_ms() -> u64 {
    50
}

fn default_submit_delay_ms() -> u64 {
    150
}

fn default_confirm_threshold() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            add_item_path: default_add_item_path(),
            listing_path: default_listing_path(),
            csrf_token: None,
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            skip_delay_ms: default_skip_delay_ms(),
            submit_delay_ms: default_submit_delay_ms(),
            confirm_threshold: default_confirm_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl BackendConfig {
    /// Absolute URL of the item creation endpoint
    pub fn add_item_url(&self) -> String {
        join_url(&self.base_url, &self.add_item_path)
    }

    /// Absolute URL of the item listing page
    pub fn listing_url(&self) -> String {
        join_url(&self.base_url, &self.listing_path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ImportConfig {
    pub fn skip_delay(&self) -> Duration {
        Duration::from_millis(self.skip_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this TOML file
    File(PathBuf),
    /// Built-in defaults; `searched` is the default location that was absent
    Defaults { searched: Option<PathBuf> },
}

impl ConfigSource {
    /// Log how the configuration was resolved; call after logging is up
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded TOML configuration from {:?}", path),
            ConfigSource::Defaults {
                searched: Some(path),
            } => warn!("Config file {:?} not found, using built-in defaults", path),
            ConfigSource::Defaults { searched: None } => {
                warn!("Could not determine config directory, using built-in defaults")
            }
        }
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub csrf_token: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load configuration from an explicit TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration, falling back to built-in defaults
    ///
    /// An explicit `path` must exist. Without one, the platform default
    /// location for `module_name` is tried and skipped if absent.
    pub fn load_or_default(path: Option<&Path>, module_name: &str) -> Result<(Self, ConfigSource)> {
        if let Some(path) = path {
            return Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_path(module_name) {
            Some(default_path) if default_path.exists() => {
                let config = Self::load(&default_path)?;
                Ok((config, ConfigSource::File(default_path)))
            }
            searched => Ok((Self::default(), ConfigSource::Defaults { searched })),
        }
    }

    /// Apply command-line overrides (highest priority)
    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend.base_url = url;
        }
        if let Some(token) = overrides.csrf_token {
            self.backend.csrf_token = Some(token);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// Reject values the tools cannot work with
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend.base_url must start with http:// or https://, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.add_item_path.trim().is_empty() {
            return Err(Error::Config("backend.add_item_path is empty".to_string()));
        }
        Ok(())
    }
}

/// Default configuration file path for a module
///
/// `<config_dir>/wowm/<module_name>.toml`, e.g. `~/.config/wowm/wowm-import.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wowm").join(format!("{}.toml", module_name)))
}
