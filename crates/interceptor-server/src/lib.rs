//! interceptor-server library crate.
//!
//! Speaks LDAP on a TCP port and answers every request on behalf of a
//! [`CredentialBackend`](interceptor_core::CredentialBackend).
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! LDAP client (BER over TCP)
//!         ↕
//! [interceptor-server]
//!   ├── domain/           Plain settings: ServerConfig, ResponseMessages
//!   ├── application/      OperationDispatcher + ConnectionFactory
//!   └── infrastructure/
//!         ├── network/    ldap3_proto codec mapping, sessions, accept loop
//!         └── storage/    TOML settings file, JSON credential source
//!         ↕
//! [interceptor-core]      records, backend contract, response composer
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `interceptor-core` only; it never
//!   sees `ldap3_proto` types or sockets.
//! - `infrastructure` owns every socket, file, and wire type.

/// Domain layer: settings types.
pub mod domain;

/// Application layer: per-connection dispatch and the factory that builds it.
pub mod application;

/// Infrastructure layer: network transport and file-backed configuration.
pub mod infrastructure;
