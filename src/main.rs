//! Listener bootstrap (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML) ──▶ BootstrapSequencer ◀── TlsConfigLoader ◀── credentials file
//!                          │
//!                          │ for each candidate port
//!                          ▼
//!                   ListenerFactory ──▶ AxumBinder ──▶ socket handler (WebSocket)
//!                          │
//!                          ▼ bound
//!                   SignalPublisher ──(SIGINT/SIGTERM: stop, SIGHUP: restart)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use listener_bootstrap::config::{load_config, BootstrapConfig};
use listener_bootstrap::http::socket_router;
use listener_bootstrap::lifecycle::{BootstrapSequencer, SignalPublisher};
use listener_bootstrap::net::tls::{ExecutableDir, FixedPath, TlsConfigLoader};
use listener_bootstrap::net::AxumBinder;
use listener_bootstrap::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "listener-bootstrap")]
#[command(about = "Bind the socket server on the first free candidate port", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Credentials properties file (overrides the configured path).
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Candidate port; repeat to build the list in priority order.
    #[arg(short, long = "port")]
    ports: Vec<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            logging::init_logging(&BootstrapConfig::default().observability.log_filter);
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if !cli.ports.is_empty() {
        config.candidate_ports = cli.ports;
    }
    if let Some(path) = cli.credentials {
        config.credentials.path = Some(path);
    }

    logging::init_logging(&config.observability.log_filter);
    tracing::info!("listener-bootstrap v0.1.0 starting");

    if let Err(errors) = listener_bootstrap::config::validation::validate_config(&config) {
        for e in errors {
            tracing::error!(error = %e, "Invalid configuration");
        }
        return ExitCode::FAILURE;
    }

    tracing::info!(
        candidate_ports = ?config.candidate_ports,
        retry_policy = ?config.retry_policy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            if let Err(e) = metrics::init_metrics(addr) {
                tracing::error!(error = %e, "Failed to start metrics endpoint");
            }
        }
    }

    let loader = match config.credentials.path.clone() {
        Some(path) => TlsConfigLoader::new(FixedPath(path)),
        None => TlsConfigLoader::new(ExecutableDir::default()),
    };
    let binder = AxumBinder::new(
        socket_router(config.server.max_message_size),
        Duration::from_secs(config.server.shutdown_grace_secs),
    );

    let sequencer = BootstrapSequencer::new(
        config.candidate_ports,
        loader,
        binder,
        Arc::new(SignalPublisher::new()),
    )
    .with_retry_policy(config.retry_policy);

    match sequencer.run().await {
        Ok(outcome) => {
            tracing::info!(
                port = outcome.port,
                restarts = outcome.restarts,
                "Shutdown complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed");
            ExitCode::FAILURE
        }
    }
}
