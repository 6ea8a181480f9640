//! TOML configuration file support.
//!
//! The file is optional.  When one is given it looks like this, and every
//! key may be omitted:
//!
//! ```toml
//! [network]
//! bind_address = "0.0.0.0"
//! port = 9823
//!
//! [device]
//! idcode = 0x1000563D
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Missing keys fall back to the same values as [`BridgeConfig::default`]
//! through `#[serde(default = "...")]`.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use bitbang_core::DEFAULT_IDCODE;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{BridgeConfig, DEFAULT_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `network.bind_address` is not an IP address.
    #[error("invalid bind address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level layout of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub network: NetworkSection,
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NetworkSection {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Simulated device settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeviceSection {
    #[serde(default = "default_idcode")]
    pub idcode: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` filter directive, e.g. `"debug"` or `"bitbang_bridge=trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_idcode() -> u32 {
    DEFAULT_IDCODE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            idcode: default_idcode(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl FileConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a value has
    /// the wrong type.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Converts the file layout into the runtime [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if `network.bind_address` is
    /// not a valid IPv4 or IPv6 address.
    pub fn into_bridge_config(self) -> Result<BridgeConfig, ConfigError> {
        let ip: IpAddr =
            self.network
                .bind_address
                .parse()
                .map_err(|source| ConfigError::InvalidAddress {
                    value: self.network.bind_address.clone(),
                    source,
                })?;
        Ok(BridgeConfig {
            bind_addr: SocketAddr::new(ip, self.network.port),
            idcode: self.device.idcode,
            log_level: self.logging.level,
        })
    }
}

/// Loads a configuration file from `path`.
///
/// Unlike an implicit default location, an explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist) and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::from_toml(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
