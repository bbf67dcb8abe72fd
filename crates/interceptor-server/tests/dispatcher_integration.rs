//! Integration tests for the dispatcher and connection factory.
//!
//! # Purpose
//!
//! These tests drive the public application API the way the TCP session
//! does: a [`ConnectionFactory`] built around a real [`InMemoryBackend`] hands
//! out dispatchers, and each dispatcher answers parsed requests.  They cover
//! the reference directory scenarios:
//!
//! - alice binds with her password → `success`
//! - alice binds with a wrong password → `invalidCredentials`
//! - searching `alice` streams one entry with her group as `memberOf`
//! - searching `nomatch` streams nothing and still succeeds
//! - delete is acknowledged whatever it names
//!
//! plus the connection-level guarantees: every message of a search carries
//! the request's message id, and dispatchers on different connections never
//! see each other's slots.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use interceptor_core::protocol::messages::{
    BindCredentials, BindRequest, DeleteRequest, LdapMessage, LdapRequest, Operation, ResponseOp,
    SearchFilter, SearchRequest,
};
use interceptor_core::{InMemoryBackend, ResultCode};
use interceptor_server::application::{ClientConnection, ConnectionFactory, SendError};
use interceptor_server::domain::ResponseMessages;

const DIRECTORY: &str = r#"[
    {"dn": "cn=alice,dc=example,dc=com", "password": "alice", "group": "publishers,ou=groups,dc=example,dc=com"},
    {"dn": "cn=bob,dc=example,dc=com", "password": "bob2", "group": "readers,ou=groups,dc=example,dc=com"}
]"#;

/// Collects everything the dispatcher streams.
#[derive(Clone, Default)]
struct Outbox {
    messages: Arc<Mutex<Vec<LdapMessage>>>,
}

impl Outbox {
    fn take(&self) -> Vec<LdapMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[async_trait]
impl ClientConnection for Outbox {
    async fn send_intermediate(&self, message: LdapMessage) -> Result<(), SendError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

fn factory() -> ConnectionFactory {
    let backend = InMemoryBackend::from_json_str(DIRECTORY).expect("directory must load");
    ConnectionFactory::new(Arc::new(backend), ResponseMessages::default())
}

fn bind(message_id: i32, dn: &str, password: &str) -> LdapRequest {
    LdapRequest::new(
        message_id,
        Operation::Bind(BindRequest {
            dn: dn.to_string(),
            credentials: BindCredentials::Simple(password.to_string()),
        }),
    )
}

fn search(message_id: i32, value: &str) -> LdapRequest {
    LdapRequest::new(
        message_id,
        Operation::Search(SearchRequest {
            base_dn: "dc=example,dc=com".to_string(),
            filter: SearchFilter::Equality {
                attribute: "cn".to_string(),
                value: value.to_string(),
            },
            attributes: Vec::new(),
        }),
    )
}

// ── Reference scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_alice_binds_with_her_password() {
    let mut dispatcher = factory().new_dispatcher(Outbox::default());

    let response = dispatcher
        .dispatch(bind(1, "cn=alice,dc=example,dc=com", "alice"))
        .await
        .unwrap();

    assert_eq!(response.result_code(), Some(ResultCode::Success));
}

#[tokio::test]
async fn test_alice_with_wrong_password_is_rejected() {
    let mut dispatcher = factory().new_dispatcher(Outbox::default());

    let response = dispatcher
        .dispatch(bind(1, "cn=alice,dc=example,dc=com", "wrong"))
        .await
        .unwrap();

    assert_eq!(response.result_code(), Some(ResultCode::InvalidCredentials));
}

#[tokio::test]
async fn test_bob_cannot_bind_with_alices_password() {
    let mut dispatcher = factory().new_dispatcher(Outbox::default());

    let response = dispatcher
        .dispatch(bind(1, "cn=bob,dc=example,dc=com", "alice"))
        .await
        .unwrap();

    assert_eq!(response.result_code(), Some(ResultCode::InvalidCredentials));
}

#[tokio::test]
async fn test_bind_dn_is_compared_case_sensitively() {
    let mut dispatcher = factory().new_dispatcher(Outbox::default());

    let response = dispatcher
        .dispatch(bind(1, "CN=alice,dc=example,dc=com", "alice"))
        .await
        .unwrap();

    assert_eq!(response.result_code(), Some(ResultCode::InvalidCredentials));
}

#[tokio::test]
async fn test_search_for_alice_streams_one_entry_then_done() {
    // Arrange
    let outbox = Outbox::default();
    let mut dispatcher = factory().new_dispatcher(outbox.clone());

    // Act
    let done = dispatcher.dispatch(search(2, "alice")).await.unwrap();

    // Assert: exactly one entry, named after the record, with its group
    let streamed = outbox.take();
    assert_eq!(streamed.len(), 1);
    let ResponseOp::SearchResultEntry(entry) = &streamed[0].op else {
        panic!("expected an entry, got {:?}", streamed[0].op);
    };
    assert_eq!(entry.dn, "cn=alice,dc=example,dc=com");
    assert_eq!(
        entry.attribute("memberOf"),
        Some(&["publishers,ou=groups,dc=example,dc=com".to_string()][..])
    );

    // Assert: all messages share the request's id and the search succeeded
    assert!(streamed.iter().all(|m| m.message_id == 2));
    assert_eq!(done.message_id, 2);
    assert!(matches!(done.op, ResponseOp::SearchResultDone(_)));
    assert_eq!(done.result_code(), Some(ResultCode::Success));
}

#[tokio::test]
async fn test_search_for_shared_suffix_streams_every_record_in_order() {
    let outbox = Outbox::default();
    let mut dispatcher = factory().new_dispatcher(outbox.clone());

    dispatcher.dispatch(search(3, "dc=example")).await.unwrap();

    let dns: Vec<String> = outbox
        .take()
        .into_iter()
        .filter_map(|m| match m.op {
            ResponseOp::SearchResultEntry(e) => Some(e.dn),
            _ => None,
        })
        .collect();
    assert_eq!(dns, ["cn=alice,dc=example,dc=com", "cn=bob,dc=example,dc=com"]);
}

#[tokio::test]
async fn test_search_without_match_is_empty_success() {
    let outbox = Outbox::default();
    let mut dispatcher = factory().new_dispatcher(outbox.clone());

    let done = dispatcher.dispatch(search(4, "nomatch")).await.unwrap();

    assert!(outbox.take().is_empty());
    assert_eq!(done.result_code(), Some(ResultCode::Success));
}

#[tokio::test]
async fn test_delete_is_acknowledged_without_touching_directory() {
    // Arrange
    let factory = factory();
    let mut dispatcher = factory.new_dispatcher(Outbox::default());
    let request = LdapRequest::new(
        5,
        Operation::Delete(DeleteRequest {
            dn: "cn=alice,dc=example,dc=com".to_string(),
        }),
    );

    // Act
    let response = dispatcher.dispatch(request).await.unwrap();

    // Assert: acknowledged, and alice still authenticates afterwards
    assert!(matches!(response.op, ResponseOp::DeleteResponse(_)));
    assert_eq!(response.result_code(), Some(ResultCode::Success));
    let rebind = dispatcher
        .dispatch(bind(6, "cn=alice,dc=example,dc=com", "alice"))
        .await
        .unwrap();
    assert_eq!(rebind.result_code(), Some(ResultCode::Success));
}

// ── Connection isolation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_connections_keep_separate_slots() {
    // Arrange: two connections from the same factory
    let factory = factory();
    let mut first = factory.new_dispatcher(Outbox::default());
    let mut second = factory.new_dispatcher(Outbox::default());

    // Act
    first
        .dispatch(bind(1, "cn=alice,dc=example,dc=com", "alice"))
        .await
        .unwrap();
    second
        .dispatch(bind(1, "cn=bob,dc=example,dc=com", "wrong"))
        .await
        .unwrap();

    // Assert
    assert_eq!(
        first.slots().bind().and_then(LdapMessage::result_code),
        Some(ResultCode::Success)
    );
    assert_eq!(
        second.slots().bind().and_then(LdapMessage::result_code),
        Some(ResultCode::InvalidCredentials)
    );
}

#[tokio::test]
async fn test_outcome_does_not_depend_on_previous_requests() {
    let mut dispatcher = factory().new_dispatcher(Outbox::default());

    // A failed bind must not taint a following good one, and vice versa.
    let sequence = [
        ("wrong", ResultCode::InvalidCredentials),
        ("alice", ResultCode::Success),
        ("wrong", ResultCode::InvalidCredentials),
    ];
    for (i, (password, expected)) in sequence.into_iter().enumerate() {
        let response = dispatcher
            .dispatch(bind(i as i32 + 1, "cn=alice,dc=example,dc=com", password))
            .await
            .unwrap();
        assert_eq!(response.result_code(), Some(expected), "bind #{i}");
    }
}
