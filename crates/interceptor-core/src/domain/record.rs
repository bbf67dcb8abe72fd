//! A single identity in the credential source.
//!
//! The on-disk form is one JSON object per record:
//!
//! ```json
//! {
//!   "dn": "cn=alice,dc=example,dc=com",
//!   "password": "alice",
//!   "group": "publishers,ou=groups,dc=example,dc=com"
//! }
//! ```
//!
//! All three fields are required.  Unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the attribute that carries a record's group on search results.
pub const MEMBER_OF_ATTRIBUTE: &str = "memberOf";

/// One directory identity: distinguished name, plaintext password, and group.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Distinguished name, e.g. `cn=alice,dc=example,dc=com`.
    pub dn: String,
    /// Plaintext password compared byte-for-byte on bind.
    pub password: String,
    /// Group membership value exposed as `memberOf` on search results.
    pub group: String,
}

impl CredentialRecord {
    /// Creates a record from its three fields.
    pub fn new(dn: impl Into<String>, password: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            password: password.into(),
            group: group.into(),
        }
    }

    /// Returns `true` if `identifier` and `secret` match this record exactly.
    ///
    /// No case folding, whitespace trimming, or DN canonicalisation is applied.
    pub fn matches_credentials(&self, identifier: &str, secret: &str) -> bool {
        self.dn == identifier && self.password == secret
    }

    /// Returns `true` if `token` occurs anywhere inside this record's DN.
    pub fn dn_contains(&self, token: &str) -> bool {
        self.dn.contains(token)
    }
}

// Passwords never reach log output through `{:?}`.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("dn", &self.dn)
            .field("password", &"<redacted>")
            .field("group", &self.group)
            .finish()
    }
}

/// The `(dn, group)` projection of a record returned by backend searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub group: String,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            group: group.into(),
        }
    }
}

impl From<&CredentialRecord> for DirectoryEntry {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            dn: record.dn.clone(),
            group: record.group.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CredentialRecord {
        CredentialRecord::new(
            "cn=alice,dc=example,dc=com",
            "alice",
            "publishers,ou=groups,dc=example,dc=com",
        )
    }

    #[test]
    fn test_matches_credentials_accepts_exact_pair() {
        assert!(alice().matches_credentials("cn=alice,dc=example,dc=com", "alice"));
    }

    #[test]
    fn test_matches_credentials_is_case_sensitive_on_dn() {
        assert!(!alice().matches_credentials("CN=alice,dc=example,dc=com", "alice"));
    }

    #[test]
    fn test_matches_credentials_does_not_trim_whitespace() {
        assert!(!alice().matches_credentials("cn=alice,dc=example,dc=com ", "alice"));
        assert!(!alice().matches_credentials("cn=alice,dc=example,dc=com", " alice"));
    }

    #[test]
    fn test_dn_contains_matches_any_substring() {
        let record = alice();
        assert!(record.dn_contains("alice"));
        assert!(record.dn_contains("dc=example"));
        assert!(record.dn_contains(""));
        assert!(!record.dn_contains("bob"));
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let record = CredentialRecord::new("cn=carol,dc=example,dc=com", "s3cret-value", "g");
        let rendered = format!("{record:?}");
        assert!(rendered.contains("cn=carol"));
        assert!(!rendered.contains("s3cret-value"));
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        // Arrange
        let json = r#"{"dn":"cn=x","password":"p","group":"g","comment":"ignored"}"#;

        // Act
        let record: CredentialRecord = serde_json::from_str(json).expect("deserialize");

        // Assert
        assert_eq!(record, CredentialRecord::new("cn=x", "p", "g"));
    }

    #[test]
    fn test_deserialize_rejects_missing_group() {
        let json = r#"{"dn":"cn=x","password":"p"}"#;
        let result: Result<CredentialRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_entry_from_record_copies_dn_and_group() {
        let entry = DirectoryEntry::from(&alice());
        assert_eq!(entry.dn, "cn=alice,dc=example,dc=com");
        assert_eq!(entry.group, "publishers,ou=groups,dc=example,dc=com");
    }
}
