//! Mapping between `ldap3_proto` PDUs and the core request/response model.
//!
//! `ldap3_proto::LdapCodec` does the BER framing; this module only moves
//! fields.  Inbound, it keeps the fields the dispatcher reads and drops the
//! rest (attribute lists of add/modify, compare assertion values, search
//! scope and limits).  Outbound, every response field is carried across.

use interceptor_core::protocol::messages::{
    AddRequest, BindCredentials, BindRequest, CompareRequest, DeleteRequest, ExtendedRequest,
    LdapMessage, LdapRequest, LdapResult, MessageId, ModifyDnRequest, ModifyRequest, Operation,
    RequestControl, ResponseOp, SearchFilter, SearchRequest,
};
use interceptor_core::protocol::result_code::ResultCode;
use ldap3_proto::proto::{
    LdapBindCred, LdapBindResponse, LdapExtendedResponse, LdapFilter, LdapMsg, LdapOp,
    LdapPartialAttribute, LdapResult as WireResult, LdapResultCode, LdapSearchResultEntry,
    LdapSearchResultReference,
};

/// What the session should do with one decoded PDU.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// An operation for the dispatcher.
    Request(LdapRequest),
    /// The client is done; close without a response.
    Unbind,
    /// Abandon the given message id.  There is never anything in flight to
    /// abandon, so this is only logged.
    Abandon(MessageId),
    /// A PDU no client should send (a response type, for instance).
    Unexpected(MessageId),
}

// ── Inbound ───────────────────────────────────────────────────────────────────

pub fn decode_request(message: LdapMsg) -> Inbound {
    let LdapMsg { msgid, op, ctrl } = message;

    let operation = match op {
        LdapOp::BindRequest(req) => Operation::Bind(BindRequest {
            dn: req.dn,
            credentials: match req.cred {
                LdapBindCred::Simple(password) => BindCredentials::Simple(password),
                #[allow(unreachable_patterns)]
                _ => BindCredentials::Sasl,
            },
        }),
        LdapOp::SearchRequest(req) => Operation::Search(SearchRequest {
            base_dn: req.base,
            filter: map_filter(req.filter),
            attributes: req.attrs,
        }),
        LdapOp::AddRequest(req) => Operation::Add(AddRequest { dn: req.dn }),
        LdapOp::DelRequest(dn) => Operation::Delete(DeleteRequest { dn }),
        LdapOp::ModifyRequest(req) => Operation::Modify(ModifyRequest { dn: req.dn }),
        LdapOp::ModifyDNRequest(req) => Operation::ModifyDn(ModifyDnRequest {
            dn: req.dn,
            new_rdn: req.newrdn,
            delete_old_rdn: req.deleteoldrdn,
            new_superior: req.new_superior,
        }),
        LdapOp::CompareRequest(req) => Operation::Compare(CompareRequest {
            dn: req.dn,
            attribute: req.atype,
        }),
        LdapOp::ExtendedRequest(req) => Operation::Extended(ExtendedRequest {
            name: req.name,
            value: req.value,
        }),
        LdapOp::UnbindRequest => return Inbound::Unbind,
        LdapOp::AbandonRequest(target) => return Inbound::Abandon(target),
        _ => return Inbound::Unexpected(msgid),
    };

    Inbound::Request(LdapRequest {
        message_id: msgid,
        operation,
        controls: ctrl
            .iter()
            .map(|c| RequestControl {
                summary: format!("{c:?}"),
            })
            .collect(),
    })
}

fn map_filter(filter: LdapFilter) -> SearchFilter {
    match filter {
        LdapFilter::Equality(attribute, value) => SearchFilter::Equality { attribute, value },
        LdapFilter::GreaterOrEqual(attribute, value) => {
            SearchFilter::GreaterOrEqual { attribute, value }
        }
        LdapFilter::LessOrEqual(attribute, value) => SearchFilter::LessOrEqual { attribute, value },
        LdapFilter::Approx(attribute, value) => SearchFilter::Approx { attribute, value },
        LdapFilter::Present(attribute) => SearchFilter::Present { attribute },
        LdapFilter::Substring(attribute, _) => SearchFilter::Substring { attribute },
        LdapFilter::And(filters) => SearchFilter::And(filters.into_iter().map(map_filter).collect()),
        LdapFilter::Or(filters) => SearchFilter::Or(filters.into_iter().map(map_filter).collect()),
        LdapFilter::Not(inner) => SearchFilter::Not(Box::new(map_filter(*inner))),
        #[allow(unreachable_patterns)]
        _ => SearchFilter::Other,
    }
}

// ── Outbound ──────────────────────────────────────────────────────────────────

pub fn encode_response(message: LdapMessage) -> LdapMsg {
    let op = match message.op {
        ResponseOp::AddResponse(result) => LdapOp::AddResponse(wire_result(result)),
        ResponseOp::BindResponse {
            result,
            server_sasl_credentials,
        } => LdapOp::BindResponse(LdapBindResponse {
            res: wire_result(result),
            saslcreds: server_sasl_credentials,
        }),
        ResponseOp::CompareResponse(result) => LdapOp::CompareResult(wire_result(result)),
        ResponseOp::DeleteResponse(result) => LdapOp::DelResponse(wire_result(result)),
        ResponseOp::ExtendedResponse {
            result,
            name,
            value,
        } => LdapOp::ExtendedResponse(LdapExtendedResponse {
            res: wire_result(result),
            name,
            value,
        }),
        ResponseOp::ModifyResponse(result) => LdapOp::ModifyResponse(wire_result(result)),
        ResponseOp::ModifyDnResponse(result) => LdapOp::ModifyDNResponse(wire_result(result)),
        ResponseOp::SearchResultEntry(entry) => LdapOp::SearchResultEntry(LdapSearchResultEntry {
            dn: entry.dn,
            attributes: entry
                .attributes
                .into_iter()
                .map(|a| LdapPartialAttribute {
                    atype: a.name,
                    vals: a.values.into_iter().map(String::into_bytes).collect(),
                })
                .collect(),
        }),
        ResponseOp::SearchResultReference(reference) => {
            LdapOp::SearchResultReference(LdapSearchResultReference {
                uris: reference.uris,
            })
        }
        ResponseOp::SearchResultDone(result) => LdapOp::SearchResultDone(wire_result(result)),
    };

    LdapMsg {
        msgid: message.message_id,
        op,
        ctrl: Vec::new(),
    }
}

fn wire_result(result: LdapResult) -> WireResult {
    WireResult {
        code: wire_code(result.code),
        matcheddn: result.matched_dn,
        message: result.diagnostic_message,
        referral: result.referrals,
    }
}

fn wire_code(code: ResultCode) -> LdapResultCode {
    match code {
        ResultCode::Success => LdapResultCode::Success,
        ResultCode::AuthMethodNotSupported => LdapResultCode::AuthMethodNotSupported,
        ResultCode::InvalidCredentials => LdapResultCode::InvalidCredentials,
        ResultCode::UnwillingToPerform => LdapResultCode::UnwillingToPerform,
        ResultCode::Other => LdapResultCode::Other,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
