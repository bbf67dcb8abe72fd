//! Protocol module: the parsed-operation abstraction, response objects, LDAP
//! result codes, and the response composer.
//!
//! Nothing here knows about BER or sockets.  The server's transport adapter
//! converts wire PDUs into [`LdapRequest`]s and [`LdapMessage`]s back into PDUs.

pub mod composer;
pub mod messages;
pub mod result_code;

pub use messages::*;
pub use result_code::ResultCode;
