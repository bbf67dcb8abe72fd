//! LDAP Interceptor entry point.
//!
//! Listens for LDAP clients and answers them from a JSON credential file:
//! binds are checked against the stored DN/password pairs, searches return
//! matching identities with their `memberOf` group, and every other operation
//! is acknowledged with `success`.
//!
//! # Usage
//!
//! ```text
//! ldap-interceptor [OPTIONS] <PORT>
//!
//! Arguments:
//!   <PORT>                 TCP port to listen on
//!
//! Options:
//!   --config <FILE>        TOML settings file
//!   --credentials <FILE>   JSON credential source [default from settings: credentials.json]
//!   --bind <IP>            Address to listen on [default from settings: 0.0.0.0]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                       | Equivalent flag   |
//! |--------------------------------|-------------------|
//! | `LDAP_INTERCEPTOR_CONFIG`      | `--config`        |
//! | `LDAP_INTERCEPTOR_CREDENTIALS` | `--credentials`   |
//! | `LDAP_INTERCEPTOR_BIND`        | `--bind`          |
//! | `RUST_LOG`                     | settings `[logging] level` |
//!
//! Flags win over the settings file.
//!
//! # Startup order
//!
//! 1. Parse the CLI and the settings file.
//! 2. Initialise `tracing`.
//! 3. Install the Ctrl+C handler.
//! 4. Load the credential source.  Failure exits non-zero before any port is
//!    opened.
//! 5. Bind the listener, log "now intercepting", and serve until Ctrl+C.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use interceptor_server::application::ConnectionFactory;
use interceptor_server::domain::ServerConfig;
use interceptor_server::infrastructure::run_server;
use interceptor_server::infrastructure::storage::{load_backend, load_config};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// LDAP endpoint backed by a JSON credential file.
#[derive(Debug, Parser)]
#[command(
    name = "ldap-interceptor",
    about = "Answers LDAP bind and search requests from a credential file",
    version
)]
struct Cli {
    /// TCP port to accept LDAP connections on.
    port: u16,

    /// TOML settings file.  A missing file means built-in defaults.
    #[arg(long, env = "LDAP_INTERCEPTOR_CONFIG")]
    config: Option<PathBuf>,

    /// JSON credential source; overrides `[credentials] path`.
    #[arg(long, env = "LDAP_INTERCEPTOR_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// IP address to listen on; overrides `[listener] bind_address`.
    #[arg(long, env = "LDAP_INTERCEPTOR_BIND")]
    bind: Option<String>,
}

impl Cli {
    /// Loads the settings file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is unreadable or malformed, or
    /// if the bind address is not an IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut settings = load_config(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load settings from {}", path.display()),
            None => "failed to load settings".to_string(),
        })?;

        if let Some(bind) = self.bind {
            settings.listener.bind_address = bind;
        }
        if let Some(path) = self.credentials {
            settings.credentials.path = path;
        }

        settings
            .into_server_config(self.port)
            .context("invalid listener settings")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `Cli::parse()` exits with a usage message when PORT is missing, repeated,
    // or not a number.
    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "LDAP interceptor starting: bind={}, credentials={}",
        config.bind_addr,
        config.credentials_path.display()
    );

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Main server loop ──────────────────────────────────────────────────────
    serve(config, running).await?;

    info!("LDAP interceptor stopped");
    Ok(())
}

/// Loads the credential source, then binds and serves until `running` is
/// cleared.  No port is opened unless the backend loaded.
async fn serve(config: ServerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let backend = load_backend(&config.credentials_path)
        .context("cannot start without a valid credential source")?;
    let factory = ConnectionFactory::new(Arc::new(backend), config.responses);

    run_server(config.bind_addr, factory, running).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
