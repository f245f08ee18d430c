//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate port + optional TLS material
//!     → connector.rs (ListenerFactory: one or two ConnectorSpecs)
//!     → tls.rs (credentials file → TlsMaterial → rustls config)
//!     → listener.rs (bind all connectors, serve until stopped)
//! ```
//!
//! # Design Decisions
//! - TLS is optional; without credentials a single plaintext connector binds
//! - Binding goes through the `Binder` trait so the sequencer can be driven
//!   without real sockets

pub mod connector;
pub mod listener;
pub mod tls;

pub use connector::{BindScope, CandidatePorts, ConnectorSpec, ListenerFactory, Transport};
pub use listener::{AxumBinder, BindError, Binder, BoundServer};
pub use tls::{TlsConfigLoader, TlsMaterial};
