//! One LDAP connection: decode a PDU, dispatch it, write the responses.
//!
//! The socket is split into a framed reader and a framed writer.  The writer
//! sits behind an `Arc<tokio::sync::Mutex>` shared by the session (terminal
//! responses) and the [`TcpClientConnection`] handed to the dispatcher
//! (streamed search entries).  Requests are handled strictly one after the
//! other, so messages for one operation are never interleaved with another's.
//!
//! The session ends when the client unbinds, closes the socket, or sends
//! bytes that do not decode.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use interceptor_core::protocol::messages::LdapMessage;
use ldap3_proto::LdapCodec;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::connection_factory::ConnectionFactory;
use crate::application::dispatcher::{ClientConnection, DispatchError, SendError};
use crate::infrastructure::network::codec::{self, Inbound};
use crate::infrastructure::network::TransportError;

type LdapWriter = FramedWrite<OwnedWriteHalf, LdapCodec>;

// ── Client connection ─────────────────────────────────────────────────────────

/// Socket-backed [`ClientConnection`].
#[derive(Clone)]
pub struct TcpClientConnection {
    writer: Arc<Mutex<LdapWriter>>,
}

impl TcpClientConnection {
    fn new(writer: Arc<Mutex<LdapWriter>>) -> Self {
        Self { writer }
    }

    async fn write(&self, message: LdapMessage) -> Result<(), std::io::Error> {
        let mut writer = self.writer.lock().await;
        writer.send(codec::encode_response(message)).await
    }
}

#[async_trait]
impl ClientConnection for TcpClientConnection {
    async fn send_intermediate(&self, message: LdapMessage) -> Result<(), SendError> {
        self.write(message).await.map_err(SendError::from)
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Entry point for each per-connection task spawned by the listener.
///
/// Wraps [`run_session`] in a `connection` span and logs how it ended.
pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, factory: ConnectionFactory) {
    let id = Uuid::new_v4();
    let span = info_span!("connection", %id, %peer);

    async move {
        info!("connection accepted");
        match run_session(stream, factory).await {
            Ok(()) => info!("connection closed"),
            Err(e) => warn!("connection closed with error: {e}"),
        }
    }
    .instrument(span)
    .await
}

/// Reads and answers requests until the client goes away.
///
/// # Errors
///
/// [`TransportError::Decode`] for an undecodable PDU and
/// [`TransportError::Write`] when a terminal response cannot be written.
pub async fn run_session(stream: TcpStream, factory: ConnectionFactory) -> Result<(), TransportError> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, LdapCodec::default());
    let writer = Arc::new(Mutex::new(FramedWrite::new(write_half, LdapCodec::default())));

    let connection = TcpClientConnection::new(Arc::clone(&writer));
    let mut dispatcher = factory.new_dispatcher(connection.clone());

    while let Some(frame) = reader.next().await {
        let pdu = frame.map_err(TransportError::Decode)?;

        match codec::decode_request(pdu) {
            Inbound::Request(request) => {
                let response = match dispatcher.dispatch(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        log_dispatch_failure(&e);
                        e.failure_response()
                    }
                };
                debug!(
                    message_id = response.message_id,
                    code = ?response.result_code(),
                    "sending terminal response"
                );
                connection.write(response).await.map_err(TransportError::Write)?;
            }
            Inbound::Unbind => {
                debug!("client unbound");
                break;
            }
            Inbound::Abandon(target) => {
                debug!(target, "abandon ignored: nothing in flight");
            }
            Inbound::Unexpected(message_id) => {
                warn!(message_id, "ignoring PDU that is not a request");
            }
        }
    }

    Ok(())
}

fn log_dispatch_failure(err: &DispatchError) {
    match err {
        DispatchError::UnsupportedFilter { .. } => warn!("{err}"),
        DispatchError::Backend { .. } => error!("{err}"),
    }
}
