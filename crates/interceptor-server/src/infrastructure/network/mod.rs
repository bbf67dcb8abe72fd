//! LDAP transport.
//!
//! - [`codec`] maps `ldap3_proto` PDUs to and from the core request/response
//!   model.  It is the only module that names `ldap3_proto` types.
//! - [`session`] runs one connection: decode, dispatch, encode.
//! - [`listener`] accepts connections until shutdown.

pub mod codec;
pub mod listener;
pub mod session;

use thiserror::Error;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client sent bytes that are not a valid LDAPMessage.  The stream
    /// cannot be resynchronised after this.
    #[error("failed to decode LDAP message: {0}")]
    Decode(#[source] std::io::Error),

    /// A response could not be written to the socket.
    #[error("failed to write LDAP response: {0}")]
    Write(#[source] std::io::Error),
}
