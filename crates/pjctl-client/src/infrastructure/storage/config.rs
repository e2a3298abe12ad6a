//! TOML-based configuration for `pjctl`.
//!
//! The file lives in the platform config directory:
//! - Windows:  `%APPDATA%\pjctl\config.toml`
//! - Linux:    `~/.config/pjctl/config.toml`
//! - macOS:    `~/Library/Application Support/pjctl/config.toml`
//!
//! Example:
//!
//! ```toml
//! [projector]
//! host = "192.168.1.50"
//! port = 20554
//! delay_ms = 1000
//! password = "hunter22"   # NZ series only
//!
//! [logging]
//! log_level = "info"
//! ```
//!
//! Every field carries a `#[serde(default = "...")]`, so a file that names
//! only `host` is complete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::{SessionConfig, DEFAULT_MAX_PAYLOAD, DEFAULT_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {field} must be greater than zero")]
    Invalid { field: &'static str },
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub projector: ProjectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the projector is and how patiently to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectorConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// TCP connect and handshake read timeout, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Ack and value read timeout, in seconds.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Minimum gap between commands, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Credential appended to `PJREQ` (NZ series).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_max_payload")]
    pub max_payload: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout_secs() -> u64 {
    60
}
fn default_command_timeout_secs() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    1000
}
fn default_max_payload() -> usize {
    DEFAULT_MAX_PAYLOAD
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            delay_ms: default_delay_ms(),
            password: None,
            max_payload: default_max_payload(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ProjectorConfig {
    /// Converts the on-disk settings into the runtime session settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a timeout or `max_payload` is zero.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        for (field, value) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("command_timeout_secs", self.command_timeout_secs),
            ("max_payload", self.max_payload as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid { field });
            }
        }

        Ok(SessionConfig {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            command_delay: Duration::from_millis(self.delay_ms),
            credential: self.password.clone(),
            max_payload: self.max_payload,
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("pjctl"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("pjctl"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("pjctl")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
