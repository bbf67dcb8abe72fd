//! Domain layer for the interceptor server.
//!
//! Plain data only: nothing here touches the network or the file system.

pub mod config;

pub use config::{ResponseMessages, ServerConfig};
