//! OS signal handling.
//!
//! # Responsibilities
//! - Translate signals into stop/restart requests on the bound instance
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGINT/SIGTERM stop the server, SIGHUP restarts the bootstrap
//! - One watcher task per bound instance; it exits when the instance stops

use std::sync::Arc;

use crate::lifecycle::instance::ServerInstance;
use crate::lifecycle::publisher::{LoggingPublisher, StatusPublisher};
use crate::lifecycle::state::BootstrapState;

/// What a received signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Stop,
    Restart,
}

/// Publisher used by the binary: logs progress and wires OS signals to the
/// bound instance. Must be used from within a Tokio runtime.
#[derive(Debug, Default)]
pub struct SignalPublisher {
    log: LoggingPublisher,
}

impl SignalPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusPublisher for SignalPublisher {
    fn on_attempt(&self, port: u16) {
        self.log.on_attempt(port);
    }

    fn on_bound(&self, instance: Arc<ServerInstance>, state: Arc<BootstrapState>) {
        self.log.on_bound(Arc::clone(&instance), state);

        tokio::spawn(async move {
            tokio::select! {
                _ = instance.stopped() => {}
                action = next_signal() => match action {
                    SignalAction::Stop => instance.request_stop(),
                    SignalAction::Restart => instance.request_restart(),
                },
            }
        });
    }

    fn on_stopped(&self, instance: &ServerInstance) {
        self.log.on_stopped(instance);
    }
}

/// Wait for the next stop or restart signal.
#[cfg(unix)]
pub async fn next_signal() -> SignalAction {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut term, mut hup) = match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
        (Ok(term), Ok(hup)) => (term, hup),
        _ => {
            tracing::warn!("Failed to install SIGTERM/SIGHUP handlers, only Ctrl+C will stop the server");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        action = ctrl_c() => action,
        _ = term.recv() => {
            tracing::info!("SIGTERM received");
            SignalAction::Stop
        }
        _ = hup.recv() => {
            tracing::info!("SIGHUP received");
            SignalAction::Restart
        }
    }
}

/// Wait for the next stop or restart signal.
#[cfg(not(unix))]
pub async fn next_signal() -> SignalAction {
    ctrl_c().await
}

async fn ctrl_c() -> SignalAction {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
    SignalAction::Stop
}
