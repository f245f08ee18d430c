//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::BootstrapConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BootstrapConfig, ConfigError> {
    let config: BootstrapConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RetryPolicy, DEFAULT_CANDIDATE_PORTS};
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.candidate_ports, DEFAULT_CANDIDATE_PORTS.to_vec());
        assert_eq!(config.retry_policy, RetryPolicy::AnyFailure);
        assert!(config.credentials.path.is_none());
    }

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
            candidate_ports = [9000, 9001]
            retry_policy = "port_in_use_only"

            [credentials]
            path = "/etc/bootstrap/bootstrap.properties"

            [server]
            shutdown_grace_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.candidate_ports, vec![9000, 9001]);
        assert_eq!(config.retry_policy, RetryPolicy::PortInUseOnly);
        assert_eq!(
            config.credentials.path.as_deref(),
            Some(Path::new("/etc/bootstrap/bootstrap.properties"))
        );
        assert_eq!(config.server.shutdown_grace_secs, 2);
    }

    #[test]
    fn invalid_config_rejected() {
        let err = parse_config("candidate_ports = []").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            parse_config("candidate_ports = [").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "candidate_ports = [7000]").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.candidate_ports, vec![7000]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("absent.toml")).unwrap_err(),
            ConfigError::Io(_)
        ));
    }
}
