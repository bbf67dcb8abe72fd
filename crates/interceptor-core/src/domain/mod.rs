//! Domain entities for the LDAP interceptor.
//!
//! Plain data only: no I/O, no async, no protocol types.  Records are built
//! once when a backend is loaded and never mutated afterwards.

/// Credential records and the directory entries derived from them.
pub mod record;
