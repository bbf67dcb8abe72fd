//! Infrastructure layer: everything that touches a socket or a file.
//!
//! - [`network`] speaks LDAP over TCP using `ldap3_proto`.
//! - [`storage`] reads the TOML settings file and the JSON credential source.

pub mod network;
pub mod storage;

pub use network::listener::{run_server, LdapListener};
