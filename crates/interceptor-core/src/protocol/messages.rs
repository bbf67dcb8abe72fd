//! Request and response types exchanged between the transport and the
//! dispatcher.
//!
//! Requests carry only the fields the interceptor looks at; everything else in
//! the PDU is dropped by the transport adapter.  Responses carry every field of
//! the corresponding LDAP response PDU so the adapter can encode them 1:1.

use std::fmt;

use crate::protocol::result_code::ResultCode;

/// LDAP `messageID`: correlates a request with all of its responses.
pub type MessageId = i32;

// ── Requests ──────────────────────────────────────────────────────────────────

/// One parsed request PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct LdapRequest {
    pub message_id: MessageId,
    pub operation: Operation,
    /// Request controls, passed through unexamined.
    pub controls: Vec<RequestControl>,
}

impl LdapRequest {
    pub fn new(message_id: MessageId, operation: Operation) -> Self {
        Self {
            message_id,
            operation,
            controls: Vec::new(),
        }
    }
}

/// An opaque request control.  Only its rendering is kept, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestControl {
    pub summary: String,
}

/// The operations the dispatcher answers.
///
/// Unbind and abandon never reach the dispatcher; the transport handles them.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Add(AddRequest),
    Bind(BindRequest),
    Compare(CompareRequest),
    Delete(DeleteRequest),
    Extended(ExtendedRequest),
    Modify(ModifyRequest),
    ModifyDn(ModifyDnRequest),
    Search(SearchRequest),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Add(_) => OperationKind::Add,
            Operation::Bind(_) => OperationKind::Bind,
            Operation::Compare(_) => OperationKind::Compare,
            Operation::Delete(_) => OperationKind::Delete,
            Operation::Extended(_) => OperationKind::Extended,
            Operation::Modify(_) => OperationKind::Modify,
            Operation::ModifyDn(_) => OperationKind::ModifyDn,
            Operation::Search(_) => OperationKind::Search,
        }
    }
}

/// Discriminant of [`Operation`], used for logging and failure responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Bind,
    Compare,
    Delete,
    Extended,
    Modify,
    ModifyDn,
    Search,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Bind => "bind",
            OperationKind::Compare => "compare",
            OperationKind::Delete => "delete",
            OperationKind::Extended => "extended",
            OperationKind::Modify => "modify",
            OperationKind::ModifyDn => "modify-dn",
            OperationKind::Search => "search",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub dn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub dn: String,
    pub credentials: BindCredentials,
}

/// Credentials presented on bind.
#[derive(Clone, PartialEq, Eq)]
pub enum BindCredentials {
    /// Simple authentication: a plaintext password.
    Simple(String),
    /// Any SASL mechanism.  The interceptor does not implement SASL.
    Sasl,
}

impl fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindCredentials::Simple(_) => f.write_str("Simple(<redacted>)"),
            BindCredentials::Sasl => f.write_str("Sasl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub dn: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub dn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequest {
    /// `requestName` OID.
    pub name: String,
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub dn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDnRequest {
    pub dn: String,
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    pub new_superior: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_dn: String,
    pub filter: SearchFilter,
    /// Requested attribute list.  Logged, not honoured.
    pub attributes: Vec<String>,
}

/// The subset of RFC 4511 filter structure the interceptor distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    Equality { attribute: String, value: String },
    GreaterOrEqual { attribute: String, value: String },
    LessOrEqual { attribute: String, value: String },
    Approx { attribute: String, value: String },
    Present { attribute: String },
    Substring { attribute: String },
    And(Vec<SearchFilter>),
    Or(Vec<SearchFilter>),
    Not(Box<SearchFilter>),
    /// Extensible match and anything else without a plain assertion value.
    Other,
}

impl SearchFilter {
    /// The assertion value of an attribute-value-assertion filter.
    ///
    /// `None` for presence, substring, composite and extensible filters.
    pub fn assertion_value(&self) -> Option<&str> {
        match self {
            SearchFilter::Equality { value, .. }
            | SearchFilter::GreaterOrEqual { value, .. }
            | SearchFilter::LessOrEqual { value, .. }
            | SearchFilter::Approx { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// The `LDAPResult` component shared by every terminal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapResult {
    pub code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    pub referrals: Vec<String>,
}

impl LdapResult {
    /// Integer form of [`LdapResult::code`].
    pub fn code_value(&self) -> i32 {
        self.code.value()
    }
}

/// A `PartialAttribute` on a search result entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub dn: String,
    pub attributes: Vec<Attribute>,
}

impl SearchResultEntry {
    /// Values of the first attribute named `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.values.as_slice())
    }
}

/// A continuation reference: LDAP URLs the client may chase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultReference {
    pub uris: Vec<String>,
}

/// One response PDU body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOp {
    AddResponse(LdapResult),
    BindResponse {
        result: LdapResult,
        server_sasl_credentials: Option<Vec<u8>>,
    },
    CompareResponse(LdapResult),
    DeleteResponse(LdapResult),
    ExtendedResponse {
        result: LdapResult,
        name: Option<String>,
        value: Option<Vec<u8>>,
    },
    ModifyResponse(LdapResult),
    ModifyDnResponse(LdapResult),
    SearchResultEntry(SearchResultEntry),
    SearchResultReference(SearchResultReference),
    SearchResultDone(LdapResult),
}

impl ResponseOp {
    /// The `LDAPResult` of a terminal response; `None` for entries and
    /// references.
    pub fn result(&self) -> Option<&LdapResult> {
        match self {
            ResponseOp::AddResponse(r)
            | ResponseOp::CompareResponse(r)
            | ResponseOp::DeleteResponse(r)
            | ResponseOp::ModifyResponse(r)
            | ResponseOp::ModifyDnResponse(r)
            | ResponseOp::SearchResultDone(r) => Some(r),
            ResponseOp::BindResponse { result, .. } | ResponseOp::ExtendedResponse { result, .. } => {
                Some(result)
            }
            ResponseOp::SearchResultEntry(_) | ResponseOp::SearchResultReference(_) => None,
        }
    }

    /// `true` for responses that end an operation.
    pub fn is_terminal(&self) -> bool {
        self.result().is_some()
    }
}

/// A response PDU addressed to a request's `messageID`.
///
/// Responses never carry controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapMessage {
    pub message_id: MessageId,
    pub op: ResponseOp,
}

impl LdapMessage {
    pub fn new(message_id: MessageId, op: ResponseOp) -> Self {
        Self { message_id, op }
    }

    pub fn result_code(&self) -> Option<ResultCode> {
        self.op.result().map(|r| r.code)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_value_present_for_equality() {
        let filter = SearchFilter::Equality {
            attribute: "cn".into(),
            value: "alice".into(),
        };
        assert_eq!(filter.assertion_value(), Some("alice"));
    }

    #[test]
    fn test_assertion_value_present_for_ordering_and_approx() {
        for filter in [
            SearchFilter::GreaterOrEqual { attribute: "uid".into(), value: "m".into() },
            SearchFilter::LessOrEqual { attribute: "uid".into(), value: "m".into() },
            SearchFilter::Approx { attribute: "uid".into(), value: "m".into() },
        ] {
            assert_eq!(filter.assertion_value(), Some("m"));
        }
    }

    #[test]
    fn test_assertion_value_absent_for_presence_and_composites() {
        let present = SearchFilter::Present { attribute: "objectClass".into() };
        let and = SearchFilter::And(vec![SearchFilter::Equality {
            attribute: "cn".into(),
            value: "alice".into(),
        }]);
        assert_eq!(present.assertion_value(), None);
        assert_eq!(and.assertion_value(), None);
        assert_eq!(SearchFilter::Other.assertion_value(), None);
    }

    #[test]
    fn test_bind_credentials_debug_redacts_password() {
        let creds = BindCredentials::Simple("hunter2".into());
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_entry_attribute_lookup_ignores_case() {
        let entry = SearchResultEntry {
            dn: "cn=alice".into(),
            attributes: vec![Attribute {
                name: "memberOf".into(),
                values: vec!["g".into()],
            }],
        };
        assert_eq!(entry.attribute("memberof"), Some(&["g".to_string()][..]));
        assert_eq!(entry.attribute("mail"), None);
    }

    #[test]
    fn test_entries_and_references_are_not_terminal() {
        let entry = ResponseOp::SearchResultEntry(SearchResultEntry {
            dn: String::new(),
            attributes: Vec::new(),
        });
        let reference = ResponseOp::SearchResultReference(SearchResultReference { uris: Vec::new() });
        assert!(!entry.is_terminal());
        assert!(!reference.is_terminal());
    }

    #[test]
    fn test_operation_kind_names() {
        assert_eq!(OperationKind::ModifyDn.to_string(), "modify-dn");
        assert_eq!(
            Operation::Delete(DeleteRequest { dn: "cn=x".into() }).kind(),
            OperationKind::Delete
        );
    }
}
