//! In-memory reference backend.
//!
//! Holds an ordered, immutable snapshot of [`CredentialRecord`]s and answers
//! queries with linear scans.  Fine for the hundreds of records a test or demo
//! directory holds; a production store would index by DN.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{BackendError, CredentialBackend};
use crate::domain::record::{CredentialRecord, DirectoryEntry};

/// A frozen list of credential records.
///
/// Built once (see [`InMemoryBackend::from_json_str`]) and shared read-only
/// afterwards.  There is no mutation API.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    records: Vec<CredentialRecord>,
}

impl InMemoryBackend {
    /// Builds a backend from already-parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::EmptyDn`] or [`BackendError::DuplicateDn`] if
    /// the records violate the snapshot invariants.
    pub fn from_records(records: Vec<CredentialRecord>) -> Result<Self, BackendError> {
        {
            let mut seen = HashSet::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                if record.dn.is_empty() {
                    return Err(BackendError::EmptyDn { index });
                }
                if !seen.insert(record.dn.as_str()) {
                    return Err(BackendError::DuplicateDn {
                        dn: record.dn.clone(),
                        index,
                    });
                }
            }
        }
        debug!(records = records.len(), "credential snapshot loaded");
        Ok(Self { records })
    }

    /// Parses a JSON array of `{dn, password, group}` objects.
    ///
    /// Any malformed item rejects the whole source; there is no partial load.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Malformed`] on a JSON or shape error, plus the
    /// invariant errors of [`InMemoryBackend::from_records`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use interceptor_core::InMemoryBackend;
    ///
    /// let backend = InMemoryBackend::from_json_str(
    ///     r#"[{"dn":"cn=alice,dc=example,dc=com","password":"alice","group":"staff"}]"#,
    /// ).unwrap();
    /// assert_eq!(backend.len(), 1);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, BackendError> {
        let records: Vec<CredentialRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records in load order.
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    /// Synchronous form of [`CredentialBackend::validate`].
    pub fn validate_now(&self, identifier: &str, secret: &str) -> bool {
        self.records
            .iter()
            .any(|record| record.matches_credentials(identifier, secret))
    }

    /// Synchronous form of [`CredentialBackend::search`].
    pub fn search_now(&self, token: &str) -> Vec<DirectoryEntry> {
        self.records
            .iter()
            .filter(|record| record.dn_contains(token))
            .map(DirectoryEntry::from)
            .collect()
    }
}

#[async_trait]
impl CredentialBackend for InMemoryBackend {
    async fn validate(&self, identifier: &str, secret: &str) -> Result<bool, BackendError> {
        Ok(self.validate_now(identifier, secret))
    }

    async fn search(&self, token: &str) -> Result<Vec<DirectoryEntry>, BackendError> {
        Ok(self.search_now(token))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
