//! Application layer: answering LDAP operations.
//!
//! - [`dispatcher`] turns one parsed request into its responses, consulting
//!   the credential backend for bind and search.
//! - [`connection_factory`] builds a fresh dispatcher for each accepted
//!   connection around the single shared backend.

pub mod connection_factory;
pub mod dispatcher;

pub use connection_factory::ConnectionFactory;
pub use dispatcher::{ClientConnection, DispatchError, OperationDispatcher, ResponseSlots, SendError};
