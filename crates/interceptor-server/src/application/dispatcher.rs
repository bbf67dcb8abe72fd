//! OperationDispatcher: answers one connection's LDAP operations.
//!
//! Each accepted connection owns exactly one dispatcher.  Requests arrive one
//! at a time from the session loop; for each, the dispatcher picks the result
//! code, composes the response and hands it back.  Only bind and search touch
//! the credential backend; every other operation is acknowledged with
//! `success` and nothing else happens.
//!
//! # Search streaming
//!
//! Search is the only operation with more than one response.  Entries (and
//! continuation references, of which the in-memory backend has none) are
//! pushed to the client through [`ClientConnection::send_intermediate`] as
//! they are composed; the terminal `SearchResultDone` is the return value of
//! [`OperationDispatcher::dispatch`] and is written by the caller.  A failed
//! intermediate send is logged and the stream carries on.
//!
//! # Architecture
//!
//! The dispatcher depends only on the [`CredentialBackend`] and
//! [`ClientConnection`] traits.  The TCP session supplies a socket-backed
//! connection; tests supply recording doubles.

use std::sync::Arc;

use async_trait::async_trait;
use interceptor_core::backend::{BackendError, CredentialBackend};
use interceptor_core::protocol::composer;
use interceptor_core::protocol::messages::{
    AddRequest, BindCredentials, BindRequest, CompareRequest, DeleteRequest, ExtendedRequest,
    LdapMessage, LdapRequest, LdapResult, MessageId, ModifyDnRequest, ModifyRequest, Operation,
    OperationKind, SearchRequest,
};
use interceptor_core::protocol::result_code::ResultCode;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::config::ResponseMessages;

/// Diagnostic text for a bind the backend could not evaluate.
const BACKEND_FAILURE_MESSAGE: &str = "credential backend failed";

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure to push an intermediate message to the client.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection closed")]
    Closed,

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An operation the dispatcher could not answer normally.
///
/// The session turns this into the terminal response for the operation via
/// [`DispatchError::failure_response`], so the client still gets exactly one
/// terminal message and the connection stays open.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The search filter has no assertion value to search on (presence,
    /// substring, and/or/not, extensible).
    #[error("search filter of message {message_id} carries no assertion value")]
    UnsupportedFilter { message_id: MessageId },

    /// The credential backend failed while answering a search.
    #[error("credential backend failed during search (message {message_id}): {source}")]
    Backend {
        message_id: MessageId,
        #[source]
        source: BackendError,
    },
}

impl DispatchError {
    pub fn message_id(&self) -> MessageId {
        match self {
            DispatchError::UnsupportedFilter { message_id }
            | DispatchError::Backend { message_id, .. } => *message_id,
        }
    }

    /// The kind of operation that failed.
    pub fn kind(&self) -> OperationKind {
        OperationKind::Search
    }

    pub fn result_code(&self) -> ResultCode {
        match self {
            DispatchError::UnsupportedFilter { .. } => ResultCode::UnwillingToPerform,
            DispatchError::Backend { .. } => ResultCode::Other,
        }
    }

    /// The terminal response that reports this failure to the client.
    pub fn failure_response(&self) -> LdapMessage {
        let result = composer::simple_result(self.result_code(), &self.to_string());
        LdapMessage::new(self.message_id(), composer::terminal_response(self.kind(), result))
    }
}

// ── Connection capability ─────────────────────────────────────────────────────

/// The one thing the dispatcher needs from the transport: a way to emit a
/// message before the terminal response.
#[async_trait]
pub trait ClientConnection: Send + Sync {
    async fn send_intermediate(&self, message: LdapMessage) -> Result<(), SendError>;
}

// ── Per-connection slots ──────────────────────────────────────────────────────

/// The most recently composed response of each type on one connection.
///
/// Every slot is overwritten each time its operation is handled; no slot
/// value ever influences a later request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSlots {
    add: Option<LdapMessage>,
    bind: Option<LdapMessage>,
    compare: Option<LdapMessage>,
    delete: Option<LdapMessage>,
    extended: Option<LdapMessage>,
    modify: Option<LdapMessage>,
    modify_dn: Option<LdapMessage>,
    search_entries: Vec<LdapMessage>,
    search_references: Vec<LdapMessage>,
    search_done: Option<LdapMessage>,
}

impl ResponseSlots {
    pub fn add(&self) -> Option<&LdapMessage> {
        self.add.as_ref()
    }

    pub fn bind(&self) -> Option<&LdapMessage> {
        self.bind.as_ref()
    }

    pub fn compare(&self) -> Option<&LdapMessage> {
        self.compare.as_ref()
    }

    pub fn delete(&self) -> Option<&LdapMessage> {
        self.delete.as_ref()
    }

    pub fn extended(&self) -> Option<&LdapMessage> {
        self.extended.as_ref()
    }

    pub fn modify(&self) -> Option<&LdapMessage> {
        self.modify.as_ref()
    }

    pub fn modify_dn(&self) -> Option<&LdapMessage> {
        self.modify_dn.as_ref()
    }

    /// Entries streamed by the latest search.
    pub fn search_entries(&self) -> &[LdapMessage] {
        &self.search_entries
    }

    /// References streamed by the latest search.
    pub fn search_references(&self) -> &[LdapMessage] {
        &self.search_references
    }

    pub fn search_done(&self) -> Option<&LdapMessage> {
        self.search_done.as_ref()
    }

    /// `true` when no operation has been handled yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Per-connection request handler.
pub struct OperationDispatcher<C> {
    backend: Arc<dyn CredentialBackend>,
    connection: C,
    messages: Arc<ResponseMessages>,
    slots: ResponseSlots,
}

impl<C: ClientConnection> OperationDispatcher<C> {
    /// Creates a dispatcher with empty slots.  Prefer
    /// [`ConnectionFactory::new_dispatcher`](super::ConnectionFactory::new_dispatcher).
    pub fn new(
        backend: Arc<dyn CredentialBackend>,
        connection: C,
        messages: Arc<ResponseMessages>,
    ) -> Self {
        Self {
            backend,
            connection,
            messages,
            slots: ResponseSlots::default(),
        }
    }

    pub fn slots(&self) -> &ResponseSlots {
        &self.slots
    }

    /// Answers one request and returns its terminal response.
    ///
    /// For a search, the entries have already been streamed through the
    /// connection when this returns.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnsupportedFilter`] or [`DispatchError::Backend`] for
    /// a search that cannot be answered.  All other operations always succeed.
    pub async fn dispatch(&mut self, request: LdapRequest) -> Result<LdapMessage, DispatchError> {
        let LdapRequest {
            message_id,
            operation,
            controls,
        } = request;
        debug!(
            message_id,
            kind = %operation.kind(),
            controls = controls.len(),
            "dispatching request"
        );

        let response = match operation {
            Operation::Add(req) => self.process_add(message_id, &req),
            Operation::Bind(req) => self.process_bind(message_id, &req).await,
            Operation::Compare(req) => self.process_compare(message_id, &req),
            Operation::Delete(req) => self.process_delete(message_id, &req),
            Operation::Extended(req) => self.process_extended(message_id, &req),
            Operation::Modify(req) => self.process_modify(message_id, &req),
            Operation::ModifyDn(req) => self.process_modify_dn(message_id, &req),
            Operation::Search(req) => self.process_search(message_id, &req).await?,
        };

        debug!(message_id, code = ?response.result_code(), "composed terminal response");
        Ok(response)
    }

    // ── Bind ──────────────────────────────────────────────────────────────────

    async fn process_bind(&mut self, message_id: MessageId, request: &BindRequest) -> LdapMessage {
        let code = match &request.credentials {
            BindCredentials::Sasl => {
                info!(message_id, dn = %request.dn, "SASL bind refused");
                ResultCode::AuthMethodNotSupported
            }
            BindCredentials::Simple(password) => {
                match self.backend.validate(&request.dn, password).await {
                    Ok(true) => {
                        info!(message_id, dn = %request.dn, "bind accepted");
                        ResultCode::Success
                    }
                    Ok(false) => {
                        info!(message_id, dn = %request.dn, "bind rejected: invalid credentials");
                        ResultCode::InvalidCredentials
                    }
                    Err(e) => {
                        error!(message_id, dn = %request.dn, "credential backend failed during bind: {e}");
                        ResultCode::Other
                    }
                }
            }
        };

        let diagnostic = if code == ResultCode::Other {
            BACKEND_FAILURE_MESSAGE
        } else {
            self.messages.bind.as_str()
        };
        let result = composer::simple_result(code, diagnostic);
        let message = LdapMessage::new(message_id, composer::bind_response(result, None));
        self.slots.bind = Some(message.clone());
        message
    }

    // ── Search ────────────────────────────────────────────────────────────────

    async fn process_search(
        &mut self,
        message_id: MessageId,
        request: &SearchRequest,
    ) -> Result<LdapMessage, DispatchError> {
        self.slots.search_entries.clear();
        self.slots.search_references.clear();
        self.slots.search_done = None;

        match self.stream_search(message_id, request).await {
            Ok(done) => {
                self.slots.search_done = Some(done.clone());
                Ok(done)
            }
            Err(e) => {
                self.slots.search_done = Some(e.failure_response());
                Err(e)
            }
        }
    }

    /// Streams the entries and references of one search and composes its
    /// done response.  Slots must already be cleared.
    async fn stream_search(
        &mut self,
        message_id: MessageId,
        request: &SearchRequest,
    ) -> Result<LdapMessage, DispatchError> {
        let token = request
            .filter
            .assertion_value()
            .ok_or(DispatchError::UnsupportedFilter { message_id })?;

        // Entries are named by the matching record, not by this DN.
        let requested_dn = format!("cn={token},{}", request.base_dn);
        debug!(
            message_id,
            token,
            requested_dn = %requested_dn,
            attributes = ?request.attributes,
            "searching credential backend"
        );

        let matches = self
            .backend
            .search(token)
            .await
            .map_err(|source| DispatchError::Backend { message_id, source })?;

        for entry in &matches {
            let message = LdapMessage::new(message_id, composer::search_result_entry(entry));
            self.slots.search_entries.push(message.clone());
            self.send_intermediate(message).await;
        }

        for uris in CONTINUATION_REFERENCES {
            let uris = uris.iter().map(|uri| uri.to_string()).collect();
            let message = LdapMessage::new(message_id, composer::search_result_reference(uris));
            self.slots.search_references.push(message.clone());
            self.send_intermediate(message).await;
        }

        info!(message_id, token, entries = matches.len(), "search answered");

        let result = composer::simple_result(ResultCode::Success, &self.messages.search);
        Ok(LdapMessage::new(message_id, composer::search_result_done(result)))
    }

    async fn send_intermediate(&self, message: LdapMessage) {
        let message_id = message.message_id;
        if let Err(e) = self.connection.send_intermediate(message).await {
            warn!(message_id, "failed to stream search result: {e}");
        }
    }

    // ── Operations answered with a fixed success ──────────────────────────────

    fn process_add(&mut self, message_id: MessageId, request: &AddRequest) -> LdapMessage {
        debug!(message_id, dn = %request.dn, "acknowledging add");
        let message = LdapMessage::new(message_id, composer::add_response(success()));
        self.slots.add = Some(message.clone());
        message
    }

    fn process_compare(&mut self, message_id: MessageId, request: &CompareRequest) -> LdapMessage {
        debug!(message_id, dn = %request.dn, attribute = %request.attribute, "acknowledging compare");
        let message = LdapMessage::new(message_id, composer::compare_response(success()));
        self.slots.compare = Some(message.clone());
        message
    }

    fn process_delete(&mut self, message_id: MessageId, request: &DeleteRequest) -> LdapMessage {
        debug!(message_id, dn = %request.dn, "acknowledging delete");
        let message = LdapMessage::new(message_id, composer::delete_response(success()));
        self.slots.delete = Some(message.clone());
        message
    }

    fn process_extended(&mut self, message_id: MessageId, request: &ExtendedRequest) -> LdapMessage {
        debug!(message_id, name = %request.name, "acknowledging extended operation");
        let message = LdapMessage::new(message_id, composer::extended_response(success(), None, None));
        self.slots.extended = Some(message.clone());
        message
    }

    fn process_modify(&mut self, message_id: MessageId, request: &ModifyRequest) -> LdapMessage {
        debug!(message_id, dn = %request.dn, "acknowledging modify");
        let message = LdapMessage::new(message_id, composer::modify_response(success()));
        self.slots.modify = Some(message.clone());
        message
    }

    fn process_modify_dn(&mut self, message_id: MessageId, request: &ModifyDnRequest) -> LdapMessage {
        debug!(
            message_id,
            dn = %request.dn,
            new_rdn = %request.new_rdn,
            delete_old_rdn = request.delete_old_rdn,
            new_superior = ?request.new_superior,
            "acknowledging modify-dn"
        );
        let message = LdapMessage::new(message_id, composer::modify_dn_response(success()));
        self.slots.modify_dn = Some(message.clone());
        message
    }
}

fn success() -> LdapResult {
    composer::simple_result(ResultCode::Success, "")
}

/// Referral URI sets sent after a search's entries.  Credential records carry
/// no referrals, so this is always empty.
const CONTINUATION_REFERENCES: &[&[&str]] = &[];

// ── Tests ─────────────────────────────────────────────────────────────────────
