//! Status publication for a bootstrap run.

use std::sync::Arc;

use crate::lifecycle::instance::ServerInstance;
use crate::lifecycle::state::BootstrapState;

/// Receives bootstrap progress and the handle of the bound server.
///
/// Whoever holds the instance may later call
/// [`ServerInstance::request_stop`] or [`ServerInstance::request_restart`].
pub trait StatusPublisher: Send + Sync {
    /// A bind attempt on `port` is about to start.
    fn on_attempt(&self, _port: u16) {}

    /// A server is bound and about to serve.
    fn on_bound(&self, instance: Arc<ServerInstance>, state: Arc<BootstrapState>);

    /// The server stopped serving.
    fn on_stopped(&self, _instance: &ServerInstance) {}
}

/// Publisher that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPublisher;

impl StatusPublisher for LoggingPublisher {
    fn on_attempt(&self, port: u16) {
        tracing::debug!(port, "Attempting bind");
    }

    fn on_bound(&self, instance: Arc<ServerInstance>, _state: Arc<BootstrapState>) {
        tracing::info!(
            instance = %instance.id(),
            port = instance.port(),
            addresses = ?instance.local_addrs(),
            "Server bound"
        );
    }

    fn on_stopped(&self, instance: &ServerInstance) {
        tracing::info!(instance = %instance.id(), port = instance.port(), "Server stopped");
    }
}
