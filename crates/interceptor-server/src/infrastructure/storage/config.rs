//! TOML settings file.
//!
//! Every field has a serde default, so an empty file, a partial file, and no
//! file at all are all valid:
//!
//! ```toml
//! [listener]
//! bind_address = "0.0.0.0"
//!
//! [credentials]
//! path = "credentials.json"
//!
//! [responses]
//! bind_message = "bind processed by ldap-interceptor"
//! search_message = "search processed by ldap-interceptor"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! The listening port is deliberately absent: it always comes from the
//! command line.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{
    ResponseMessages, ServerConfig, DEFAULT_BIND_MESSAGE, DEFAULT_SEARCH_MESSAGE,
};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error other than "not found".
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `listener.bind_address` is not an IP address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterceptorConfig {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub responses: ResponsesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenerConfig {
    /// IP address to listen on.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    /// JSON credential source, relative to the working directory.
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponsesConfig {
    #[serde(default = "default_bind_message")]
    pub bind_message: String,
    #[serde(default = "default_search_message")]
    pub search_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}
fn default_bind_message() -> String {
    DEFAULT_BIND_MESSAGE.to_string()
}
fn default_search_message() -> String {
    DEFAULT_SEARCH_MESSAGE.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            bind_message: default_bind_message(),
            search_message: default_search_message(),
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

impl InterceptorConfig {
    /// Resolves the settings into a [`ServerConfig`] listening on `port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if `listener.bind_address`
    /// is not an IPv4 or IPv6 address.
    pub fn into_server_config(self, port: u16) -> Result<ServerConfig, ConfigError> {
        let ip: IpAddr = self.listener.bind_address.parse().map_err(|source| {
            ConfigError::InvalidBindAddress {
                value: self.listener.bind_address.clone(),
                source,
            }
        })?;

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(ip, port),
            credentials_path: self.credentials.path,
            responses: ResponseMessages {
                bind: self.responses.bind_message,
                search: self.responses.search_message,
            },
            log_level: self.logging.level,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the settings file at `path`.
///
/// `None`, or a path that does not exist, yields
/// [`InterceptorConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<InterceptorConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(InterceptorConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InterceptorConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
