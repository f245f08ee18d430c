//! Connector descriptors and the factory that derives them from a candidate port.
//!
//! # Port Mapping
//! ```text
//! TLS unavailable:  plaintext  0.0.0.0:p
//! TLS available:    plaintext  0.0.0.0:p+1
//!                   TLS        127.0.0.1:p
//! ```
//!
//! The TLS endpoint never leaves the loopback interface; the plaintext
//! fallback one port above it stays open on all interfaces so peers that
//! cannot speak TLS still find the server.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::Deref;
use std::sync::Arc;

use crate::net::tls::TlsMaterial;

/// Fixed, ordered list of ports a bootstrap run may try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePorts(Arc<[u16]>);

impl CandidatePorts {
    pub fn new(ports: impl Into<Arc<[u16]>>) -> Self {
        Self(ports.into())
    }
}

impl From<Vec<u16>> for CandidatePorts {
    fn from(ports: Vec<u16>) -> Self {
        Self::new(ports)
    }
}

impl<const N: usize> From<[u16; N]> for CandidatePorts {
    fn from(ports: [u16; N]) -> Self {
        Self::new(ports.to_vec())
    }
}

impl Deref for CandidatePorts {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        &self.0
    }
}

/// Which interfaces a connector accepts connections on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindScope {
    AllInterfaces,
    LoopbackOnly,
}

impl BindScope {
    pub fn ip(self) -> IpAddr {
        match self {
            BindScope::AllInterfaces => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            BindScope::LoopbackOnly => IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

/// Transport spoken on a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Plaintext,
    Tls,
}

/// One socket to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorSpec {
    pub port: u16,
    pub scope: BindScope,
    pub transport: Transport,
}

impl ConnectorSpec {
    pub fn plaintext(port: u16) -> Self {
        Self {
            port,
            scope: BindScope::AllInterfaces,
            transport: Transport::Plaintext,
        }
    }

    pub fn tls_loopback(port: u16) -> Self {
        Self {
            port,
            scope: BindScope::LoopbackOnly,
            transport: Transport::Tls,
        }
    }

    /// Socket address this connector binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.scope.ip(), self.port)
    }

    pub fn is_tls(&self) -> bool {
        self.transport == Transport::Tls
    }
}

impl fmt::Display for ConnectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.transport {
            Transport::Plaintext => "ws",
            Transport::Tls => "wss",
        };
        write!(f, "{}://{}", scheme, self.socket_addr())
    }
}

/// Builds the connector set for a candidate port.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerFactory;

impl ListenerFactory {
    pub fn new() -> Self {
        Self
    }

    /// Connectors to bind for `port`, given the TLS material loaded for the run.
    pub fn build(&self, port: u16, tls: Option<&TlsMaterial>) -> Vec<ConnectorSpec> {
        if tls.is_none() {
            return vec![ConnectorSpec::plaintext(port)];
        }

        let mut specs = Vec::with_capacity(2);
        match port.checked_add(1) {
            Some(fallback) => specs.push(ConnectorSpec::plaintext(fallback)),
            None => tracing::warn!(port, "No room for plaintext fallback above candidate port"),
        }
        specs.push(ConnectorSpec::tls_loopback(port));
        specs
    }
}
