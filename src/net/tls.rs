//! TLS credentials discovery and certificate loading.
//!
//! # Responsibilities
//! - Resolve the credentials file through a pluggable [`PathResolver`]
//! - Extract keystore path and passphrase from it ([`TlsConfigLoader`])
//! - Turn a PEM keystore into an axum-server rustls configuration
//!
//! # Design Decisions
//! - Loading never fails the caller: absence downgrades to plaintext
//! - Material is all-or-nothing; a half-filled file counts as absent

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use zeroize::Zeroizing;

use crate::config::Properties;

/// Properties key holding the keystore path.
pub const KEYSTORE_KEY: &str = "wss.keystore";
/// Properties key holding the keystore passphrase.
pub const STOREPASS_KEY: &str = "wss.storepass";
/// File name looked up next to the executable when no path is configured.
pub const DEFAULT_PROPERTIES_FILE: &str = "listener-bootstrap.properties";

/// Credentials needed to terminate TLS.
#[derive(Clone)]
pub struct TlsMaterial {
    keystore: PathBuf,
    passphrase: Zeroizing<String>,
}

impl TlsMaterial {
    pub fn new(keystore: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            keystore: keystore.into(),
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    /// PEM file holding the certificate chain and private key.
    pub fn keystore(&self) -> &Path {
        &self.keystore
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("keystore", &self.keystore)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Why credentials could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("could not resolve credentials file path: {0}")]
    Resolve(#[source] io::Error),

    #[error("could not read credentials file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("credentials file {path:?} has no value for {key}")]
    MissingKey { path: PathBuf, key: &'static str },
}

/// Locates the credentials file.
pub trait PathResolver: Send + Sync {
    fn resolve(&self) -> io::Result<PathBuf>;
}

/// A fixed, configured path.
#[derive(Debug, Clone)]
pub struct FixedPath(pub PathBuf);

impl PathResolver for FixedPath {
    fn resolve(&self) -> io::Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// A file sitting next to the running executable.
#[derive(Debug, Clone)]
pub struct ExecutableDir {
    file_name: String,
}

impl ExecutableDir {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Default for ExecutableDir {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTIES_FILE)
    }
}

impl PathResolver for ExecutableDir {
    fn resolve(&self) -> io::Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory")
        })?;
        Ok(dir.join(&self.file_name))
    }
}

/// Loads [`TlsMaterial`] from the resolved credentials file.
#[derive(Clone)]
pub struct TlsConfigLoader {
    resolver: Arc<dyn PathResolver>,
}

impl TlsConfigLoader {
    pub fn new(resolver: impl PathResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Loader for an explicit credentials file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FixedPath(path.into()))
    }

    /// Load the credentials, or `None` when they are unavailable.
    ///
    /// Failures are logged at warn level and never returned.
    pub fn load(&self) -> Option<TlsMaterial> {
        match self.try_load() {
            Ok(material) => {
                tracing::info!(keystore = ?material.keystore(), "TLS credentials loaded");
                Some(material)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load TLS credentials, launching in insecure mode");
                None
            }
        }
    }

    /// Load the credentials, reporting why they are unavailable.
    pub fn try_load(&self) -> Result<TlsMaterial, CredentialsError> {
        let path = self.resolver.resolve().map_err(CredentialsError::Resolve)?;
        tracing::info!(path = ?path, "Reading TLS credentials file");

        let content = std::fs::read_to_string(&path).map_err(|source| CredentialsError::Io {
            path: path.clone(),
            source,
        })?;
        let props = Properties::parse(&content);

        let required = |key: &'static str| {
            props
                .get_non_empty(key)
                .ok_or_else(|| CredentialsError::MissingKey {
                    path: path.clone(),
                    key,
                })
        };
        let keystore = required(KEYSTORE_KEY)?;
        let passphrase = required(STOREPASS_KEY)?;

        // Relative keystores live beside the credentials file.
        let keystore = match path.parent() {
            Some(dir) if Path::new(keystore).is_relative() => dir.join(keystore),
            _ => PathBuf::from(keystore),
        };

        Ok(TlsMaterial::new(keystore, passphrase))
    }
}

impl fmt::Debug for TlsConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfigLoader").finish_non_exhaustive()
    }
}

/// Build a rustls server configuration from a PEM keystore.
///
/// The keystore must hold at least one certificate and an unencrypted
/// private key. Certificates form the chain in the order they appear.
pub async fn load_tls_config(material: &TlsMaterial) -> io::Result<RustlsConfig> {
    let pem = tokio::fs::read(material.keystore()).await?;

    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .map(|cert| cert.map(|c| c.as_ref().to_vec()))
        .collect::<io::Result<Vec<_>>>()?;
    if certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in keystore: {:?}", material.keystore()),
        ));
    }

    let key = rustls_pemfile::private_key(&mut pem.as_slice())?.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no private key found in keystore: {:?}", material.keystore()),
        )
    })?;

    RustlsConfig::from_der(certs, key.secret_der().to_vec()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_props(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("bootstrap.properties");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_complete_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(
            dir.path(),
            "wss.keystore=/etc/keys/keystore.pem\nwss.storepass=hunter2\n",
        );

        let material = TlsConfigLoader::from_path(path).load().unwrap();
        assert_eq!(material.keystore(), Path::new("/etc/keys/keystore.pem"));
        assert_eq!(material.passphrase(), "hunter2");
    }

    #[test]
    fn relative_keystore_resolves_beside_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(dir.path(), "wss.keystore=keys/ks.pem\nwss.storepass=x\n");

        let material = TlsConfigLoader::from_path(path).try_load().unwrap();
        assert_eq!(material.keystore(), dir.path().join("keys/ks.pem"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TlsConfigLoader::from_path(dir.path().join("absent.properties"));

        assert!(loader.load().is_none());
        assert!(matches!(loader.try_load(), Err(CredentialsError::Io { .. })));
    }

    #[test]
    fn partial_material_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(dir.path(), "wss.keystore=/etc/keys/keystore.pem\n");
        let loader = TlsConfigLoader::from_path(path);

        assert!(loader.load().is_none());
        assert!(matches!(
            loader.try_load(),
            Err(CredentialsError::MissingKey { key: STOREPASS_KEY, .. })
        ));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_props(dir.path(), "wss.keystore=\nwss.storepass=x\n");

        assert!(matches!(
            TlsConfigLoader::from_path(path).try_load(),
            Err(CredentialsError::MissingKey { key: KEYSTORE_KEY, .. })
        ));
    }

    #[test]
    fn resolver_failure_is_unavailable() {
        struct Broken;
        impl PathResolver for Broken {
            fn resolve(&self) -> io::Result<PathBuf> {
                Err(io::Error::new(io::ErrorKind::NotFound, "nowhere"))
            }
        }

        let loader = TlsConfigLoader::new(Broken);
        assert!(loader.load().is_none());
        assert!(matches!(loader.try_load(), Err(CredentialsError::Resolve(_))));
    }

    #[test]
    fn debug_redacts_passphrase() {
        let material = TlsMaterial::new("/ks.pem", "hunter2");
        let shown = format!("{:?}", material);
        assert!(shown.contains("/ks.pem"));
        assert!(!shown.contains("hunter2"));
    }

    #[tokio::test]
    async fn keystore_without_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = dir.path().join("ks.pem");
        fs::write(&keystore, "not a pem file\n").unwrap();

        let err = load_tls_config(&TlsMaterial::new(keystore, "x")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn fixture_keystore_loads() {
        let keystore = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keystore.pem");
        assert!(load_tls_config(&TlsMaterial::new(keystore, "changeit")).await.is_ok());
    }
}
