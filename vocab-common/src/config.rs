//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (clap also folds in `VOCAB_*` environment variables)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error. A TOML file that exists but cannot be
//! parsed is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Default bind address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default capacity of the view invalidation event bus
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so that a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// HTTP bind address
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Capacity of the invalidation event bus
    #[serde(default)]
    pub event_bus_capacity: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error, or a full EnvFilter directive)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }
}

/// Command-line overrides (highest priority)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
    pub event_bus_capacity: usize,
}

impl ServiceConfig {
    /// Resolve configuration from overrides, TOML file and defaults
    ///
    /// `config_file` names an explicit TOML file, which must exist. Without it
    /// the platform config locations are checked and silently skipped when absent.
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match config_file {
            Some(path) => TomlConfig::load(path)?,
            None => match default_config_file() {
                Some(path) => TomlConfig::load(&path)?,
                None => {
                    debug!("No config file found, using compiled defaults");
                    TomlConfig::default()
                }
            },
        };

        Ok(Self::merge(toml_config, overrides))
    }

    /// Merge a parsed TOML config with overrides, filling gaps from defaults
    pub fn merge(toml_config: TomlConfig, overrides: ConfigOverrides) -> Self {
        Self {
            database_path: overrides
                .database_path
                .or(toml_config.database_path)
                .unwrap_or_else(default_database_path),
            port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            bind_address: overrides
                .bind_address
                .or(toml_config.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            log_level: overrides.log_level.unwrap_or(toml_config.logging.level),
            event_bus_capacity: toml_config
                .event_bus_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_EVENT_BUS_CAPACITY),
        }
    }

    /// Address string suitable for `TcpListener::bind`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Locate the platform configuration file, if one exists
///
/// Linux checks `~/.config/vocab/config.toml` then `/etc/vocab/config.toml`;
/// other platforms check only the user config directory.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("vocab").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/vocab/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vocab"))
        .unwrap_or_else(|| PathBuf::from("./vocab_data"))
        .join("vocab.db")
}
