//! LDAP listener: accept loop and per-connection task management.
//!
//! Every accepted connection is handed to its own Tokio task together with a
//! clone of the [`ConnectionFactory`]; the loop itself never waits on a
//! client.  Shutdown is driven by a shared `AtomicBool` that `main.rs` clears
//! on Ctrl+C.  `accept()` runs under a 200 ms timeout so the flag is checked
//! even when nobody is connecting.  Sessions already running are left to
//! finish on their own.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{error, info};

use crate::application::connection_factory::ConnectionFactory;
use crate::infrastructure::network::session::handle_connection;

/// How often the accept loop re-checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A bound LDAP listening socket.
pub struct LdapListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl LdapListener {
    /// Binds `addr`.  Port `0` picks a free port; see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns an error if the port is in use or the process lacks permission
    /// to bind it.
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind LDAP listener on {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read LDAP listener address")?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `running` is cleared.
    pub async fn serve(self, factory: ConnectionFactory, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    let factory = factory.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, peer, factory).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient (e.g. out of file descriptors); keep serving.
                    error!("accept error: {e}");
                }
                Err(_) => {}
            }
        }

        Ok(())
    }
}

/// Binds `bind_addr`, announces it, and serves until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn run_server(
    bind_addr: SocketAddr,
    factory: ConnectionFactory,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = LdapListener::bind(bind_addr).await?;
    info!("now intercepting LDAP traffic on {}", listener.local_addr());
    listener.serve(factory, running).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
