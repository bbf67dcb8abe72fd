//! # interceptor-core
//!
//! Shared library for the LDAP interceptor containing the credential record
//! model, the credential backend contract with its in-memory reference
//! implementation, and the transport-independent LDAP request/response model.
//!
//! It has zero dependencies on sockets, file systems, or the LDAP wire codec.
//!
//! # Architecture overview
//!
//! The interceptor answers LDAP traffic on behalf of a credential source that
//! does not speak LDAP itself.  Bind requests become password checks, search
//! requests become lookups, and every other operation gets a canned success.
//!
//! - **`domain`** – The directory facts: a [`CredentialRecord`] per identity
//!   and the [`DirectoryEntry`] projection returned by searches.
//!
//! - **`backend`** – The [`CredentialBackend`] trait (validate + search) and
//!   [`InMemoryBackend`], which loads a JSON array once and is shared
//!   read-only afterwards.
//!
//! - **`protocol`** – The parsed-operation abstraction handed over by the
//!   transport, the response objects handed back, the LDAP result codes, and
//!   the pure response composer.

pub mod backend;
pub mod domain;
pub mod protocol;

pub use backend::memory::InMemoryBackend;
pub use backend::{BackendError, CredentialBackend};
pub use domain::record::{CredentialRecord, DirectoryEntry};
pub use protocol::messages::{LdapMessage, LdapRequest, LdapResult, MessageId, Operation, ResponseOp};
pub use protocol::result_code::ResultCode;
