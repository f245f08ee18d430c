//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field has a default so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ports tried in order when no configuration overrides them.
pub const DEFAULT_CANDIDATE_PORTS: [u16; 4] = [8181, 8282, 8383, 8484];

/// Root configuration for the listener bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Ordered candidate ports; order is retry priority.
    pub candidate_ports: Vec<u16>,

    /// How non-port-in-use bind failures are treated.
    pub retry_policy: RetryPolicy,

    /// Credentials file location.
    pub credentials: CredentialsConfig,

    /// Serving behaviour once bound.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            candidate_ports: DEFAULT_CANDIDATE_PORTS.to_vec(),
            retry_policy: RetryPolicy::default(),
            credentials: CredentialsConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Failure classification policy for bind attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Any bind failure advances to the next candidate.
    #[default]
    AnyFailure,
    /// Only port-in-use advances; any other failure ends the run.
    PortInUseOnly,
}

/// Credentials file configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Explicit path to the properties file.
    /// When unset, the file is looked up next to the executable.
    pub path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Time allowed for open connections to drain after a stop request.
    pub shutdown_grace_secs: u64,

    /// Largest WebSocket message accepted by the socket handler.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
            max_message_size: 64 * 1024 * 1024, // 64MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "listener_bootstrap=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
