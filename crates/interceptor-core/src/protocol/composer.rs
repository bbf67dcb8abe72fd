//! Response composer: one pure constructor per LDAP response type.
//!
//! Callers in this system only ever pass empty matched DNs and no referrals,
//! but every `LDAPResult` field is still set explicitly so the encoded PDU is
//! complete.

use crate::domain::record::{DirectoryEntry, MEMBER_OF_ATTRIBUTE};
use crate::protocol::messages::{
    Attribute, LdapResult, OperationKind, ResponseOp, SearchResultEntry, SearchResultReference,
};
use crate::protocol::result_code::ResultCode;

/// Builds an `LDAPResult`.  Absent optional fields encode as empty.
pub fn ldap_result(
    code: ResultCode,
    matched_dn: Option<&str>,
    diagnostic_message: Option<&str>,
    referral_urls: Option<Vec<String>>,
) -> LdapResult {
    LdapResult {
        code,
        matched_dn: matched_dn.unwrap_or_default().to_string(),
        diagnostic_message: diagnostic_message.unwrap_or_default().to_string(),
        referrals: referral_urls.unwrap_or_default(),
    }
}

/// Shorthand for a result with only a code and diagnostic message.
pub fn simple_result(code: ResultCode, diagnostic_message: &str) -> LdapResult {
    ldap_result(code, None, Some(diagnostic_message), None)
}

pub fn add_response(result: LdapResult) -> ResponseOp {
    ResponseOp::AddResponse(result)
}

pub fn bind_response(result: LdapResult, server_sasl_credentials: Option<Vec<u8>>) -> ResponseOp {
    ResponseOp::BindResponse {
        result,
        server_sasl_credentials,
    }
}

pub fn compare_response(result: LdapResult) -> ResponseOp {
    ResponseOp::CompareResponse(result)
}

pub fn delete_response(result: LdapResult) -> ResponseOp {
    ResponseOp::DeleteResponse(result)
}

pub fn extended_response(
    result: LdapResult,
    name: Option<String>,
    value: Option<Vec<u8>>,
) -> ResponseOp {
    ResponseOp::ExtendedResponse {
        result,
        name,
        value,
    }
}

pub fn modify_response(result: LdapResult) -> ResponseOp {
    ResponseOp::ModifyResponse(result)
}

pub fn modify_dn_response(result: LdapResult) -> ResponseOp {
    ResponseOp::ModifyDnResponse(result)
}

/// A search result entry for a backend match: the record's DN as the entry
/// name and its group as the single `memberOf` value.
pub fn search_result_entry(entry: &DirectoryEntry) -> ResponseOp {
    ResponseOp::SearchResultEntry(SearchResultEntry {
        dn: entry.dn.clone(),
        attributes: vec![Attribute {
            name: MEMBER_OF_ATTRIBUTE.to_string(),
            values: vec![entry.group.clone()],
        }],
    })
}

pub fn search_result_reference(uris: Vec<String>) -> ResponseOp {
    ResponseOp::SearchResultReference(SearchResultReference { uris })
}

pub fn search_result_done(result: LdapResult) -> ResponseOp {
    ResponseOp::SearchResultDone(result)
}

/// The terminal response type for `kind`, carrying `result`.
///
/// Used when an operation fails before its normal response is composed.
pub fn terminal_response(kind: OperationKind, result: LdapResult) -> ResponseOp {
    match kind {
        OperationKind::Add => add_response(result),
        OperationKind::Bind => bind_response(result, None),
        OperationKind::Compare => compare_response(result),
        OperationKind::Delete => delete_response(result),
        OperationKind::Extended => extended_response(result, None, None),
        OperationKind::Modify => modify_response(result),
        OperationKind::ModifyDn => modify_dn_response(result),
        OperationKind::Search => search_result_done(result),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
