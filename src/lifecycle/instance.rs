//! Handle to a bound, serving server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::net::connector::ConnectorSpec;

/// A live server. Cloned behind `Arc` to whoever may need to stop it;
/// every method is safe to call from any thread.
#[derive(Debug)]
pub struct ServerInstance {
    id: Uuid,
    port: u16,
    attempt_index: usize,
    connectors: Vec<ConnectorSpec>,
    local_addrs: Vec<SocketAddr>,
    stop: CancellationToken,
    restart: AtomicBool,
}

impl ServerInstance {
    pub fn new(
        port: u16,
        attempt_index: usize,
        connectors: Vec<ConnectorSpec>,
        local_addrs: Vec<SocketAddr>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            port,
            attempt_index,
            connectors,
            local_addrs,
            stop: CancellationToken::new(),
            restart: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The candidate port this instance was bound for.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn attempt_index(&self) -> usize {
        self.attempt_index
    }

    pub fn connectors(&self) -> &[ConnectorSpec] {
        &self.connectors
    }

    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    /// Stop serving. The bootstrap run ends without trying more candidates.
    pub fn request_stop(&self) {
        tracing::info!(instance = %self.id, port = self.port, "Stop requested");
        self.stop.cancel();
    }

    /// Stop serving and bootstrap again from the first candidate.
    pub fn request_restart(&self) {
        tracing::info!(instance = %self.id, port = self.port, "Restart requested");
        self.restart.store(true, Ordering::SeqCst);
        self.stop.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn restart_requested(&self) -> bool {
        self.restart.load(Ordering::SeqCst)
    }

    /// Resolves once a stop or restart has been requested.
    pub fn stopped(&self) -> WaitForCancellationFuture<'_> {
        self.stop.cancelled()
    }

    pub(crate) fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ServerInstance {
        ServerInstance::new(9000, 0, vec![ConnectorSpec::plaintext(9000)], Vec::new())
    }

    #[test]
    fn stop_cancels_without_restart() {
        let instance = instance();
        let token = instance.stop_token();
        instance.request_stop();
        assert!(token.is_cancelled());
        assert!(instance.is_stop_requested());
        assert!(!instance.restart_requested());
    }

    #[test]
    fn restart_also_stops() {
        let instance = instance();
        instance.request_restart();
        assert!(instance.is_stop_requested());
        assert!(instance.restart_requested());
    }

    #[tokio::test]
    async fn stopped_resolves_after_stop() {
        let instance = instance();
        instance.request_stop();
        instance.stopped().await;
    }
}
