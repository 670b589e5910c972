// Review Gate server entrypoint

use anyhow::Context;
use clap::Parser;
use review_authority::ReviewTokenAuthority;
use review_server::{build_ledger, router, LedgerBackend, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "review-gate")]
#[command(about = "Token-gated review submission service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Ledger backend (memory, http)
    #[arg(long)]
    ledger_backend: Option<LedgerBackend>,

    /// Ledger gateway base URL
    #[arg(long)]
    ledger_endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(backend) = self.ledger_backend {
            config.ledger.backend = backend;
        }
        if let Some(endpoint) = self.ledger_endpoint {
            config.ledger.endpoint = Some(endpoint);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    let ledger = build_ledger(&config).context("initialising ledger handler")?;
    let authority = Arc::new(ReviewTokenAuthority::new(ledger));
    let app = router(authority, config.cors_permissive);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        %addr,
        ledger = %config.ledger.backend,
        "review gate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("review gate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
