//! The credential backend contract.
//!
//! A backend answers exactly two questions about a fixed set of identities:
//! "do these credentials belong to someone?" (bind) and "which identities
//! mention this token?" (search).  The dispatcher depends only on the
//! [`CredentialBackend`] trait; [`memory::InMemoryBackend`] is the reference
//! implementation loaded from a JSON array.
//!
//! # Sharing
//!
//! One backend instance is built at startup, wrapped in an `Arc`, and handed
//! to every connection.  Implementations must therefore be `Send + Sync`.  The
//! in-memory backend achieves that by never mutating after construction.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::record::DirectoryEntry;

pub mod memory;

/// Errors raised while loading or querying a credential backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The credential source is not a JSON array of well-formed records.
    #[error("malformed credential source: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A record has an empty distinguished name.
    #[error("record #{index} has an empty dn")]
    EmptyDn { index: usize },

    /// Two records share the same distinguished name.
    #[error("duplicate dn '{dn}' at record #{index}")]
    DuplicateDn { dn: String, index: usize },

    /// The backend could not answer a query (store unreachable, timeout, ...).
    #[error("credential backend unavailable: {0}")]
    Unavailable(String),
}

/// Capability surface over a collection of credential records.
///
/// Both operations are read-only and idempotent for a given snapshot.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Returns `Ok(true)` iff some record has `dn == identifier` and
    /// `password == secret`, compared exactly.
    async fn validate(&self, identifier: &str, secret: &str) -> Result<bool, BackendError>;

    /// Returns every record whose DN contains `token` as a substring, in load
    /// order.  No match yields an empty vector, never an error.
    async fn search(&self, token: &str) -> Result<Vec<DirectoryEntry>, BackendError>;
}
