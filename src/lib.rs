//! Resilient listener bootstrap.
//!
//! Walks a fixed list of candidate ports, binding a TLS connector on loopback
//! plus a plaintext fallback when credentials are available (plaintext only
//! otherwise), and serves the registered socket handler until stopped.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::BootstrapConfig;
pub use lifecycle::{BootstrapError, BootstrapOutcome, BootstrapSequencer, StatusPublisher};
pub use net::{AxumBinder, TlsConfigLoader};
