//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! bootstrap config (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated, immutable)
//!
//! credentials file (flat key/value)
//!     → properties.rs (parse)
//!     → net::tls (extract keystore + passphrase)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod properties;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use properties::Properties;
pub use schema::BootstrapConfig;
pub use schema::CredentialsConfig;
pub use schema::RetryPolicy;
pub use schema::ServerConfig;
