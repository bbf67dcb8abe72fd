//! ConnectionFactory: one fresh dispatcher per accepted connection.
//!
//! The factory holds the single credential backend built at startup and the
//! response messages from the configuration.  Cloning it is cheap (two `Arc`
//! bumps), so the accept loop hands a clone to every session task.

use std::sync::Arc;

use interceptor_core::backend::CredentialBackend;

use crate::application::dispatcher::{ClientConnection, OperationDispatcher};
use crate::domain::config::ResponseMessages;

#[derive(Clone)]
pub struct ConnectionFactory {
    backend: Arc<dyn CredentialBackend>,
    messages: Arc<ResponseMessages>,
}

impl ConnectionFactory {
    pub fn new(backend: Arc<dyn CredentialBackend>, messages: ResponseMessages) -> Self {
        Self {
            backend,
            messages: Arc::new(messages),
        }
    }

    /// Builds a dispatcher bound to `connection`.
    ///
    /// The dispatcher shares the backend with every other connection but
    /// starts with empty response slots of its own.
    pub fn new_dispatcher<C: ClientConnection>(&self, connection: C) -> OperationDispatcher<C> {
        OperationDispatcher::new(Arc::clone(&self.backend), connection, Arc::clone(&self.messages))
    }

    pub fn backend(&self) -> &Arc<dyn CredentialBackend> {
        &self.backend
    }

    pub fn messages(&self) -> &ResponseMessages {
        &self.messages
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use interceptor_core::protocol::messages::{
        BindCredentials, BindRequest, LdapMessage, LdapRequest, Operation,
    };
    use interceptor_core::{CredentialRecord, InMemoryBackend, ResultCode};

    use crate::application::dispatcher::SendError;

    struct NullConnection;

    #[async_trait]
    impl ClientConnection for NullConnection {
        async fn send_intermediate(&self, _message: LdapMessage) -> Result<(), SendError> {
            Ok(())
        }
    }

    fn factory() -> ConnectionFactory {
        let backend = InMemoryBackend::from_records(vec![CredentialRecord::new(
            "cn=alice,dc=example,dc=com",
            "alice",
            "publishers,ou=groups,dc=example,dc=com",
        )])
        .unwrap();
        ConnectionFactory::new(Arc::new(backend), ResponseMessages::default())
    }

    fn alice_bind(message_id: i32) -> LdapRequest {
        LdapRequest::new(
            message_id,
            Operation::Bind(BindRequest {
                dn: "cn=alice,dc=example,dc=com".to_string(),
                credentials: BindCredentials::Simple("alice".to_string()),
            }),
        )
    }

    #[test]
    fn test_new_dispatcher_starts_with_empty_slots() {
        let dispatcher = factory().new_dispatcher(NullConnection);
        assert!(dispatcher.slots().is_empty());
    }

    #[tokio::test]
    async fn test_dispatchers_do_not_share_slots() {
        // Arrange
        let factory = factory();
        let mut first = factory.new_dispatcher(NullConnection);
        first.dispatch(alice_bind(1)).await.unwrap();

        // Act
        let second = factory.new_dispatcher(NullConnection);

        // Assert
        assert!(first.slots().bind().is_some());
        assert!(second.slots().is_empty());
    }

    #[test]
    fn test_dispatchers_share_one_backend() {
        // Arrange
        let factory = factory();
        let _a = factory.new_dispatcher(NullConnection);
        let _b = factory.new_dispatcher(NullConnection);

        // Assert: the factory plus two dispatchers hold the backend
        assert_eq!(Arc::strong_count(factory.backend()), 3);
    }

    #[tokio::test]
    async fn test_factory_is_usable_from_concurrent_tasks() {
        // Arrange
        let factory = factory();

        // Act: build and drive dispatchers on several tasks at once
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let factory = factory.clone();
                tokio::spawn(async move {
                    let mut dispatcher = factory.new_dispatcher(NullConnection);
                    dispatcher.dispatch(alice_bind(i)).await.unwrap()
                })
            })
            .collect();

        // Assert
        for handle in handles {
            let response = handle.await.unwrap();
            assert_eq!(response.result_code(), Some(ResultCode::Success));
        }
    }

    #[test]
    fn test_factory_exposes_configured_messages() {
        let messages = ResponseMessages {
            bind: "hello".into(),
            search: "found".into(),
        };
        let factory = ConnectionFactory::new(Arc::new(InMemoryBackend::default()), messages.clone());
        assert_eq!(factory.messages(), &messages);
    }
}
