//! Bootstrap sequencing over the candidate port list.
//!
//! # State Machine
//! ```text
//! Idle ──load TLS once──▶ AttemptingBind(0)
//! AttemptingBind(i) ──bind ok──────────────▶ Serving
//! AttemptingBind(i) ──bind failed, i+1 < n─▶ AttemptingBind(i+1)
//! AttemptingBind(i) ──bind failed, last───▶ Stopped (exhausted)
//! Serving ──stop requested────────────────▶ Stopped
//! Serving ──restart requested─────────────▶ Idle ──▶ AttemptingBind(0)
//! ```
//!
//! # Design Decisions
//! - Attempts are strictly sequential on the calling task
//! - Under [`RetryPolicy::AnyFailure`] every bind failure advances to the
//!   next candidate; one bad port must not block the others
//! - Exhaustion is returned as an error, not only logged

use std::sync::Arc;

use crate::config::RetryPolicy;
use crate::lifecycle::instance::ServerInstance;
use crate::lifecycle::publisher::StatusPublisher;
use crate::lifecycle::state::BootstrapState;
use crate::net::connector::{CandidatePorts, ConnectorSpec, ListenerFactory};
use crate::net::listener::{BindError, Binder, BoundServer};
use crate::net::tls::{TlsConfigLoader, TlsMaterial};
use crate::observability::metrics;

/// A bind attempt that did not succeed.
#[derive(Debug)]
pub struct AttemptFailure {
    pub port: u16,
    pub error: BindError,
}

/// How a run that bound a server ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Candidate port of the last bound server.
    pub port: u16,
    /// Its index in the candidate list.
    pub attempt_index: usize,
    pub connectors: Vec<ConnectorSpec>,
    /// Restarts served before the final stop.
    pub restarts: u32,
}

/// Error type for a bootstrap run.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Every candidate failed to bind.
    #[error("all {} candidate ports failed to bind", failures.len())]
    CandidatesExhausted { failures: Vec<AttemptFailure> },

    /// A non-port-in-use failure under [`RetryPolicy::PortInUseOnly`].
    #[error("binding candidate port {port} failed: {source}")]
    Bind {
        port: u16,
        #[source]
        source: BindError,
    },

    /// The bound server failed while serving.
    #[error("server on port {port} failed: {source}")]
    Serve {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Walks the candidate ports until one binds, then serves until stopped.
pub struct BootstrapSequencer<B> {
    candidates: CandidatePorts,
    loader: TlsConfigLoader,
    factory: ListenerFactory,
    binder: B,
    publisher: Arc<dyn StatusPublisher>,
    policy: RetryPolicy,
    state: Arc<BootstrapState>,
}

impl<B: Binder> BootstrapSequencer<B> {
    pub fn new(
        candidates: impl Into<CandidatePorts>,
        loader: TlsConfigLoader,
        binder: B,
        publisher: Arc<dyn StatusPublisher>,
    ) -> Self {
        Self {
            candidates: candidates.into(),
            loader,
            factory: ListenerFactory::new(),
            binder,
            publisher,
            policy: RetryPolicy::default(),
            state: Arc::new(BootstrapState::new()),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// State shared with publishers and observers.
    pub fn state(&self) -> Arc<BootstrapState> {
        Arc::clone(&self.state)
    }

    /// Run until the bound server is stopped, or until no candidate binds.
    ///
    /// TLS material is loaded once per call and reused across restarts.
    pub async fn run(&self) -> Result<BootstrapOutcome, BootstrapError> {
        self.state.reset();
        let tls = self.loader.load();
        let mut restarts = 0;

        loop {
            let (index, connectors, server) = self.bind_first_available(tls.as_ref()).await?;
            let port = self.candidates[index];

            let instance = Arc::new(ServerInstance::new(
                port,
                index,
                connectors.clone(),
                server.local_addrs(),
            ));
            self.state.activate(Arc::clone(&instance));
            metrics::set_serving(true);
            tracing::info!(
                port,
                attempt_index = index,
                addresses = ?instance.local_addrs(),
                "Server started"
            );
            self.publisher.on_bound(Arc::clone(&instance), self.state());

            let served = server.serve(instance.stop_token()).await;

            metrics::set_serving(false);
            self.state.mark_stopped();
            self.publisher.on_stopped(&instance);
            tracing::info!(port, "Shutting down server");

            if let Err(source) = served {
                tracing::error!(port, error = %source, "Server failed while serving");
                return Err(BootstrapError::Serve { port, source });
            }

            if !instance.restart_requested() {
                return Ok(BootstrapOutcome {
                    port,
                    attempt_index: index,
                    connectors,
                    restarts,
                });
            }

            restarts += 1;
            tracing::info!(restarts, "Restarting from the first candidate port");
            self.state.reset();
        }
    }

    async fn bind_first_available(
        &self,
        tls: Option<&TlsMaterial>,
    ) -> Result<(usize, Vec<ConnectorSpec>, B::Server), BootstrapError> {
        let mut failures = Vec::new();

        while let Some(index) = self.state.advance(self.candidates.len()) {
            let port = self.candidates[index];
            self.publisher.on_attempt(port);
            let specs = self.factory.build(port, tls);

            let error = match self.binder.bind(&specs, tls).await {
                Ok(server) => {
                    metrics::record_bind_attempt("bound");
                    return Ok((index, specs, server));
                }
                Err(error) => error,
            };

            if let BindError::PortInUse { addr } = &error {
                metrics::record_bind_attempt("port_in_use");
                tracing::warn!(
                    port,
                    address = %addr,
                    attempt_index = index,
                    "Port {} is already in use",
                    addr.port()
                );
            } else {
                metrics::record_bind_attempt("failed");
                tracing::error!(port, attempt_index = index, error = %error, detail = ?error, "Bind failed");
                if self.policy == RetryPolicy::PortInUseOnly {
                    self.state.mark_stopped();
                    return Err(BootstrapError::Bind {
                        port,
                        source: error,
                    });
                }
            }

            failures.push(AttemptFailure { port, error });
        }

        tracing::error!(
            candidates = ?&self.candidates[..],
            "No candidate port could be bound"
        );
        Err(BootstrapError::CandidatesExhausted { failures })
    }
}
