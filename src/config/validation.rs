//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports usable, grace period > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BootstrapConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::BootstrapConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("candidate_ports must not be empty")]
    NoCandidatePorts,

    #[error("candidate port at index {index} is 0")]
    ZeroPort { index: usize },

    #[error("candidate port {port} leaves no room for the plaintext fallback on port + 1")]
    NoFallbackPort { port: u16 },

    #[error("shutdown_grace_secs must be greater than 0")]
    ZeroGracePeriod,

    #[error("metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.candidate_ports.is_empty() {
        errors.push(ValidationError::NoCandidatePorts);
    }

    for (index, &port) in config.candidate_ports.iter().enumerate() {
        if port == 0 {
            errors.push(ValidationError::ZeroPort { index });
        } else if port == u16::MAX {
            errors.push(ValidationError::NoFallbackPort { port });
        }
    }

    if config.server.shutdown_grace_secs == 0 {
        errors.push(ValidationError::ZeroGracePeriod);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&BootstrapConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_error() {
        let mut config = BootstrapConfig::default();
        config.candidate_ports = vec![0, 8181, u16::MAX];
        config.server.shutdown_grace_secs = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not an address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort { index: 0 },
                ValidationError::NoFallbackPort { port: u16::MAX },
                ValidationError::ZeroGracePeriod,
                ValidationError::MetricsAddress("not an address".into()),
            ]
        );
    }

    #[test]
    fn empty_candidate_list_rejected() {
        let mut config = BootstrapConfig::default();
        config.candidate_ports.clear();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::NoCandidatePorts])
        );
    }

    #[test]
    fn bad_metrics_address_ignored_when_disabled() {
        let mut config = BootstrapConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
