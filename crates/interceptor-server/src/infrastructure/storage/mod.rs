//! File-backed configuration: the optional TOML settings file and the JSON
//! credential source.

pub mod config;
pub mod credentials;

pub use config::{load_config, ConfigError, InterceptorConfig};
pub use credentials::{load_backend, CredentialsError};
