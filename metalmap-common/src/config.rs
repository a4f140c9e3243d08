//! Configuration loading and config file resolution
//!
//! Configuration file location, in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `METALMAP_CONFIG` environment variable
//! 3. `<config dir>/metalmap/config.toml` when it exists
//! 4. Compiled defaults (no file)
//!
//! A missing or unreadable file never stops startup: a warning is logged and
//! the compiled defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::notify::{DEFAULT_PULSE_DURATION, DEFAULT_TOAST_DURATION};
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "METALMAP_CONFIG";

/// Default world atlas (110m country polygons)
pub const DEFAULT_TOPOLOGY_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";

/// Default band table file name
pub const DEFAULT_BANDS_CSV: &str = "metal_bands_2017.csv";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data sources
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Band table (CSV)
    #[serde(default = "default_bands_csv")]
    pub bands_csv: PathBuf,
    /// Topology source: `http(s)` URL or local path
    #[serde(default = "default_topology")]
    pub topology: String,
}

/// HTTP server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Timings of transient UI elements
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Toast auto-dismiss delay in milliseconds
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
    /// Search pulse duration in milliseconds
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bands_csv() -> PathBuf {
    PathBuf::from(DEFAULT_BANDS_CSV)
}

fn default_topology() -> String {
    DEFAULT_TOPOLOGY_URL.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5790
}

fn default_toast_ms() -> u64 {
    DEFAULT_TOAST_DURATION.as_millis() as u64
}

fn default_pulse_ms() -> u64 {
    DEFAULT_PULSE_DURATION.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            bands_csv: default_bands_csv(),
            topology: default_topology(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: default_toast_ms(),
            pulse_ms: default_pulse_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl UiConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve and load the config, falling back to defaults
    pub fn load_or_default(cli_arg: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(cli_arg) else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load config {} ({}), using compiled defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Locate the config file following the priority order above
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("metalmap").join("config.toml"))
        .filter(|p| p.exists())
}

/// Whether a topology source names a remote resource
pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
