//! Bootstrap configuration and root folder resolution
//!
//! Configuration priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file is not fatal: the service logs a warning and starts
//! with defaults. A config file that exists but fails to parse is an error.
//! The upstream endpoint has no default; the service refuses to start without one.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the root (data) folder
pub const ROOT_FOLDER_ENV: &str = "TWMOD_ROOT_FOLDER";

/// Default HTTP port for twmod-mq
pub const DEFAULT_PORT: u16 = 5730;

/// Largest accepted review queue capacity
pub const MAX_QUEUE_CAPACITY: usize = 100_000;

/// Bootstrap configuration loaded from TOML
///
/// Every field has a compiled default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Root folder for service data (optional)
    pub root_folder: Option<PathBuf>,

    /// SQLite database path (defaults to `<root_folder>/twmod.db`)
    pub database_path: Option<PathBuf>,

    pub logging: LoggingConfig,
    pub queues: QueueConfig,
    pub learning: LearningConfig,
    pub stream: StreamConfig,
    pub events: EventsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root_folder: None,
            database_path: None,
            logging: LoggingConfig::default(),
            queues: QueueConfig::default(),
            learning: LearningConfig::default(),
            stream: StreamConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Review queue capacities (0 = unbounded)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    pub pending_capacity: usize,
    pub approved_capacity: usize,
    pub rejected_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            pending_capacity: 10,
            approved_capacity: 50,
            rejected_capacity: 50,
        }
    }
}

/// Online word-weight model settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LearningConfig {
    /// Weight delta applied per token on each human override
    pub learning_rate: f64,
    /// Period of the weight snapshot save timer
    pub save_interval_secs: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            save_interval_secs: 60,
        }
    }
}

/// Upstream stream provider settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Streaming endpoint, required by the service at startup
    pub endpoint: Option<String>,
    /// Bearer token sent upstream (overridden by TWMOD_STREAM_TOKEN)
    pub bearer_token: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bearer_token: None,
            connect_timeout_secs: 30,
        }
    }
}

/// Event bus settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel buffer size
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when the file is missing
    ///
    /// Reporting the missing file is left to the caller, which may not have a
    /// logger installed yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.learning.learning_rate.is_finite() || self.learning.learning_rate <= 0.0 {
            return Err(Error::Config(format!(
                "learning.learning_rate must be a positive number, got {}",
                self.learning.learning_rate
            )));
        }
        if self.learning.save_interval_secs == 0 {
            return Err(Error::Config(
                "learning.save_interval_secs must be greater than zero".to_string(),
            ));
        }
        for (name, capacity) in [
            ("pending_capacity", self.queues.pending_capacity),
            ("approved_capacity", self.queues.approved_capacity),
            ("rejected_capacity", self.queues.rejected_capacity),
        ] {
            if capacity > MAX_QUEUE_CAPACITY {
                return Err(Error::Config(format!(
                    "queues.{} must be at most {} (0 = unbounded), got {}",
                    name, MAX_QUEUE_CAPACITY, capacity
                )));
            }
        }
        if self.events.channel_capacity == 0 {
            return Err(Error::Config(
                "events.channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured upstream endpoint
    ///
    /// Missing or blank means there is nothing to track from.
    pub fn stream_endpoint(&self) -> Result<&str> {
        self.stream
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Config("stream.endpoint is not configured".to_string()))
    }

    /// Database path, resolved against the root folder when not set explicitly
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| root_folder.join("twmod.db"))
    }
}

/// Default config file location (`<config_dir>/twmod/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("twmod").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("twmod"))
        .unwrap_or_else(|| PathBuf::from("./twmod_data"))
}

/// Root folder resolution
///
/// Priority: CLI argument, `TWMOD_ROOT_FOLDER`, TOML `root_folder`, OS default.
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
            toml_value: None,
        }
    }

    pub fn with_cli(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    pub fn with_toml(mut self, path: Option<PathBuf>) -> Self {
        self.toml_value = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            info!("{}: root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("{}: root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            info!("{}: root folder from config file: {}", self.module_name, path.display());
            return path.clone();
        }

        let path = default_root_folder();
        info!("{}: using default root folder: {}", self.module_name, path.display());
        path
    }

    /// Resolve and make sure the folder exists
    pub fn resolve_and_create(&self) -> Result<PathBuf> {
        let path = self.resolve();
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}
