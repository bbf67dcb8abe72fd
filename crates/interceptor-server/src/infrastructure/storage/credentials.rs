//! JSON credential source.
//!
//! The file is a JSON array with one object per identity:
//!
//! ```json
//! [
//!   { "dn": "cn=alice,dc=example,dc=com", "password": "alice",
//!     "group": "publishers,ou=groups,dc=example,dc=com" }
//! ]
//! ```
//!
//! It is read exactly once, before the listener binds.  Any failure here is
//! fatal: the interceptor never serves from a partially loaded directory.

use std::path::{Path, PathBuf};

use interceptor_core::{BackendError, InMemoryBackend};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("I/O error reading credentials at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credential source {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Reads `path` and builds the in-memory backend from it.
///
/// # Errors
///
/// [`CredentialsError::Io`] if the file cannot be read;
/// [`CredentialsError::Invalid`] if it is not a JSON array of complete
/// records or violates DN uniqueness.
pub fn load_backend(path: &Path) -> Result<InMemoryBackend, CredentialsError> {
    let content = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let backend =
        InMemoryBackend::from_json_str(&content).map_err(|source| CredentialsError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

    if backend.is_empty() {
        warn!("credential source {} holds no records; every bind will fail", path.display());
    } else {
        info!("loaded {} credential records from {}", backend.len(), path.display());
    }
    Ok(backend)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
