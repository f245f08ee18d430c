//! Socket binding and serving.
//!
//! # Responsibilities
//! - Bind every connector of a candidate port, or none of them
//! - Classify bind failures (port in use vs. everything else)
//! - Serve the registered socket handler until a stop is requested
//!
//! # Design Decisions
//! - Bind is eager: sockets are open when `bind` returns, so failures are
//!   reported per candidate instead of surfacing later from `serve`
//! - Serving has no timeout; cancellation is the only way out

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::net::connector::ConnectorSpec;
use crate::net::tls::{load_tls_config, TlsMaterial};

/// Error type for bind attempts.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// Another socket already owns the address.
    #[error("address {addr} is already in use")]
    PortInUse { addr: SocketAddr },

    /// Any other socket-level failure.
    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The keystore could not be turned into a TLS context.
    #[error("failed to build TLS context from {keystore:?}: {source}")]
    Tls {
        keystore: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A TLS connector was requested without TLS material.
    #[error("TLS connector {0} requested without TLS material")]
    MissingTlsMaterial(ConnectorSpec),

    /// Nothing to bind.
    #[error("no connectors to bind")]
    NoConnectors,
}

impl BindError {
    /// Classify a socket error for `addr`.
    pub fn from_io(addr: SocketAddr, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AddrInUse {
            BindError::PortInUse { addr }
        } else {
            BindError::Io { addr, source }
        }
    }

    pub fn is_port_in_use(&self) -> bool {
        matches!(self, BindError::PortInUse { .. })
    }
}

/// The network stack a bootstrap run binds through.
pub trait Binder: Send + Sync {
    type Server: BoundServer;

    /// Open every connector in `specs`. On failure, nothing stays bound.
    fn bind(
        &self,
        specs: &[ConnectorSpec],
        tls: Option<&TlsMaterial>,
    ) -> impl Future<Output = Result<Self::Server, BindError>> + Send;
}

/// Sockets that are bound but not yet serving.
pub trait BoundServer: Send {
    /// Actual addresses of the bound sockets.
    fn local_addrs(&self) -> Vec<SocketAddr>;

    /// Serve until `stop` is cancelled.
    fn serve(self, stop: CancellationToken) -> impl Future<Output = io::Result<()>> + Send;
}

/// Binds connectors with tokio and serves them with axum-server.
#[derive(Clone)]
pub struct AxumBinder {
    app: Router,
    shutdown_grace: Duration,
}

impl AxumBinder {
    /// `app` is the socket handler registered on every connector.
    pub fn new(app: Router, shutdown_grace: Duration) -> Self {
        Self { app, shutdown_grace }
    }
}

impl Binder for AxumBinder {
    type Server = AxumServer;

    async fn bind(
        &self,
        specs: &[ConnectorSpec],
        tls: Option<&TlsMaterial>,
    ) -> Result<AxumServer, BindError> {
        if specs.is_empty() {
            return Err(BindError::NoConnectors);
        }

        // Build the TLS context before touching sockets so a bad keystore
        // never leaves a half-bound candidate behind.
        let rustls = match specs.iter().find(|s| s.is_tls()) {
            Some(spec) => {
                let material = tls.ok_or(BindError::MissingTlsMaterial(*spec))?;
                let config = load_tls_config(material)
                    .await
                    .map_err(|source| BindError::Tls {
                        keystore: material.keystore().to_path_buf(),
                        source,
                    })?;
                Some(config)
            }
            None => None,
        };

        let mut listeners = Vec::with_capacity(specs.len());
        for spec in specs {
            let addr = spec.socket_addr();
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| BindError::from_io(addr, e))?;
            let local_addr = listener
                .local_addr()
                .map_err(|e| BindError::from_io(addr, e))?;
            let std_listener = listener
                .into_std()
                .map_err(|e| BindError::from_io(addr, e))?;

            tracing::debug!(connector = %spec, address = %local_addr, "Connector bound");

            let tls = if spec.is_tls() { rustls.clone() } else { None };
            listeners.push(BoundListener {
                spec: *spec,
                local_addr,
                listener: std_listener,
                tls,
            });
        }

        Ok(AxumServer {
            app: self.app.clone(),
            listeners,
            shutdown_grace: self.shutdown_grace,
        })
    }
}

struct BoundListener {
    spec: ConnectorSpec,
    local_addr: SocketAddr,
    listener: std::net::TcpListener,
    tls: Option<RustlsConfig>,
}

/// Sockets bound by [`AxumBinder`].
pub struct AxumServer {
    app: Router,
    listeners: Vec<BoundListener>,
    shutdown_grace: Duration,
}

impl BoundServer for AxumServer {
    fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.iter().map(|l| l.local_addr).collect()
    }

    async fn serve(self, stop: CancellationToken) -> io::Result<()> {
        let handle = Handle::new();
        let mut servers = JoinSet::new();

        for bound in self.listeners {
            let app = self.app.clone().into_make_service();
            let handle = handle.clone();
            tracing::info!(connector = %bound.spec, address = %bound.local_addr, "Serving");

            match bound.tls {
                Some(config) => {
                    servers.spawn(
                        axum_server::from_tcp_rustls(bound.listener, config)
                            .handle(handle)
                            .serve(app),
                    );
                }
                None => {
                    servers.spawn(axum_server::from_tcp(bound.listener).handle(handle).serve(app));
                }
            }
        }

        let mut result = Ok(());
        tokio::select! {
            _ = stop.cancelled() => {
                tracing::debug!(grace = ?self.shutdown_grace, "Stop requested, draining connections");
                handle.graceful_shutdown(Some(self.shutdown_grace));
            }
            Some(joined) = servers.join_next() => {
                // One connector died on its own; take the rest down with it.
                result = flatten(joined);
                if result.is_ok() {
                    result = Err(io::Error::other("connector stopped unexpectedly"));
                }
                handle.shutdown();
            }
        }

        while let Some(joined) = servers.join_next().await {
            if let Err(e) = flatten(joined) {
                tracing::warn!(error = %e, "Connector exited with error during shutdown");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        result
    }
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_in_use_classified() {
        let addr: SocketAddr = "0.0.0.0:8181".parse().unwrap();
        let err = BindError::from_io(addr, io::Error::from(io::ErrorKind::AddrInUse));
        assert!(err.is_port_in_use());
        assert_eq!(err.to_string(), "address 0.0.0.0:8181 is already in use");
    }

    #[test]
    fn other_errors_not_port_in_use() {
        let addr: SocketAddr = "0.0.0.0:80".parse().unwrap();
        let err = BindError::from_io(addr, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_port_in_use());
        assert!(matches!(err, BindError::Io { .. }));
    }

    #[tokio::test]
    async fn empty_spec_list_rejected() {
        let binder = AxumBinder::new(Router::new(), Duration::from_secs(1));
        assert!(matches!(binder.bind(&[], None).await, Err(BindError::NoConnectors)));
    }

    #[tokio::test]
    async fn tls_spec_without_material_rejected() {
        let binder = AxumBinder::new(Router::new(), Duration::from_secs(1));
        let spec = ConnectorSpec::tls_loopback(0);
        assert!(matches!(
            binder.bind(&[spec], None).await,
            Err(BindError::MissingTlsMaterial(_))
        ));
    }

    #[tokio::test]
    async fn occupied_port_reported_as_in_use() {
        let occupied = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let binder = AxumBinder::new(Router::new(), Duration::from_secs(1));
        let err = binder
            .bind(&[ConnectorSpec::plaintext(port)], None)
            .await
            .err()
            .unwrap();
        assert!(err.is_port_in_use(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn serve_returns_after_stop() {
        let binder = AxumBinder::new(Router::new(), Duration::from_millis(100));
        let server = binder.bind(&[ConnectorSpec::plaintext(0)], None).await.unwrap();
        assert_eq!(server.local_addrs().len(), 1);

        let stop = CancellationToken::new();
        let task = tokio::spawn(server.serve(stop.clone()));
        stop.cancel();

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("serve did not return")
            .unwrap()
            .unwrap();
    }
}
