//! Server configuration types.
//!
//! [`ServerConfig`] is assembled once in `main.rs` from the settings file and
//! the command line, then split up: the listener takes the address, the
//! credential loader takes the path, and every dispatcher shares the
//! [`ResponseMessages`].

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_MESSAGE: &str = "bind processed by ldap-interceptor";
pub const DEFAULT_SEARCH_MESSAGE: &str = "search processed by ldap-interceptor";

/// Diagnostic text attached to bind and search-done responses.
///
/// Every other response carries an empty diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessages {
    pub bind: String,
    pub search: String,
}

impl Default for ResponseMessages {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_MESSAGE.to_string(),
            search: DEFAULT_SEARCH_MESSAGE.to_string(),
        }
    }
}

/// All runtime configuration for the interceptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the LDAP listener binds to.
    pub bind_addr: SocketAddr,

    /// JSON credential source loaded into the in-memory backend at startup.
    pub credentials_path: PathBuf,

    pub responses: ResponseMessages,

    /// Fallback `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
