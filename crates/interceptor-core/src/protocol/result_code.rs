//! LDAP result codes (RFC 4511 §4.1.9) produced by the interceptor.
//!
//! Only the codes the interceptor can actually return are modelled: success,
//! the two bind refusals, and the two search failures.  The integer values
//! are the ones that travel on the wire.

use std::fmt;

/// Outcome of an LDAP operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    Success = 0,
    AuthMethodNotSupported = 7,
    InvalidCredentials = 49,
    UnwillingToPerform = 53,
    Other = 80,
}

impl ResultCode {
    /// The integer carried in the `resultCode` field of an `LDAPResult`.
    pub fn value(self) -> i32 {
        self as i32
    }

    /// The RFC 4511 descriptor, e.g. `invalidCredentials`.
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::AuthMethodNotSupported => "authMethodNotSupported",
            ResultCode::InvalidCredentials => "invalidCredentials",
            ResultCode::UnwillingToPerform => "unwillingToPerform",
            ResultCode::Other => "other",
        }
    }
}

impl TryFrom<i32> for ResultCode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            0 => Ok(ResultCode::Success),
            7 => Ok(ResultCode::AuthMethodNotSupported),
            49 => Ok(ResultCode::InvalidCredentials),
            53 => Ok(ResultCode::UnwillingToPerform),
            80 => Ok(ResultCode::Other),
            other => Err(other),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ResultCode; 5] = [
        ResultCode::Success,
        ResultCode::AuthMethodNotSupported,
        ResultCode::InvalidCredentials,
        ResultCode::UnwillingToPerform,
        ResultCode::Other,
    ];

    #[test]
    fn test_wire_values_match_rfc_4511() {
        assert_eq!(ResultCode::Success.value(), 0);
        assert_eq!(ResultCode::InvalidCredentials.value(), 49);
        assert_eq!(ResultCode::UnwillingToPerform.value(), 53);
        assert_eq!(ResultCode::Other.value(), 80);
    }

    #[test]
    fn test_try_from_accepts_every_modelled_value() {
        for code in ALL {
            assert_eq!(ResultCode::try_from(code.value()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_returns_unknown_value_as_error() {
        assert_eq!(ResultCode::try_from(32), Err(32));
    }

    #[test]
    fn test_display_includes_name_and_value() {
        assert_eq!(ResultCode::InvalidCredentials.to_string(), "invalidCredentials (49)");
    }
}
