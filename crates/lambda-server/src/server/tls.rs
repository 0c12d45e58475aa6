//! TLS material loading and `rustls` server configuration.
//!
//! The TLS locator is a directory holding `cert.pem` and `key.pem`. Both are
//! read eagerly when the server is constructed and parsed into a
//! [`rustls::ServerConfig`] right away, so a broken pair fails construction
//! instead of the first handshake.

use std::{
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use rustls::ServerConfig;
use thiserror::Error;

/// Certificate chain file name inside the TLS directory.
pub const CERT_FILE: &str = "cert.pem";

/// Private key file name inside the TLS directory.
pub const KEY_FILE: &str = "key.pem";

/// Errors produced while loading TLS material.
#[derive(Debug, Error)]
pub enum TlsError {
    /// A PEM file could not be read as UTF-8 text.
    #[error("failed to read TLS file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate file held no parseable certificate.
    #[error("failed to parse TLS certificate chain: {0}")]
    Certificate(String),

    /// The key file held no parseable private key.
    #[error("failed to parse TLS private key: {0}")]
    PrivateKey(String),

    /// rustls rejected the certificate/key pair.
    #[error("failed to build rustls ServerConfig: {0}")]
    Config(#[from] rustls::Error),
}

/// PEM certificate and private key, always loaded as a pair.
#[derive(Clone)]
pub struct TlsMaterial {
    /// PEM-encoded certificate chain.
    pub cert_pem: String,
    /// PEM-encoded private key.
    pub key_pem: String,
}

impl TlsMaterial {
    /// Read `cert.pem` and `key.pem` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TlsError::Read`] naming the first file that is missing or
    /// not valid UTF-8.
    pub fn load(dir: &Path) -> Result<Self, TlsError> {
        let cert_pem = read_pem(&dir.join(CERT_FILE))?;
        let key_pem = read_pem(&dir.join(KEY_FILE))?;
        Ok(Self { cert_pem, key_pem })
    }
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("TlsMaterial")
            .field("cert_pem_len", &self.cert_pem.len())
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

fn read_pem(path: &Path) -> Result<String, TlsError> {
    std::fs::read_to_string(path).map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and key.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(material: &TlsMaterial) -> Result<Arc<ServerConfig>, TlsError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(material.cert_pem.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::Certificate(e.to_string()))?;
    if certs.is_empty() {
        return Err(TlsError::Certificate(format!("no certificate found in {CERT_FILE}")));
    }

    let key = rustls_pemfile::private_key(&mut BufReader::new(material.key_pem.as_bytes()))
        .map_err(|e| TlsError::PrivateKey(e.to_string()))?
        .ok_or_else(|| TlsError::PrivateKey(format!("no private key found in {KEY_FILE}")))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(cert: &str, key: &str) -> TlsMaterial {
        TlsMaterial {
            cert_pem: cert.into(),
            key_pem: key.into(),
        }
    }

    #[test]
    fn rejects_empty_cert_pem() {
        let result = build_server_config(&material("", ""));
        assert!(matches!(result, Err(TlsError::Certificate(_))));
    }

    #[test]
    fn rejects_garbage_pem() {
        let result = build_server_config(&material("not a pem", "also not a pem"));
        assert!(result.is_err());
    }

    #[test]
    fn accepts_self_signed_pair() {
        let generated = rcgen::generate_simple_self_signed(vec!["localhost".into()]).unwrap();
        let m = material(&generated.cert.pem(), &generated.key_pair.serialize_pem());
        let config = build_server_config(&m).unwrap();
        assert_eq!(config.alpn_protocols[1], b"http/1.1".to_vec());
    }

    #[test]
    fn rejects_cert_without_key() {
        let generated = rcgen::generate_simple_self_signed(vec!["localhost".into()]).unwrap();
        let result = build_server_config(&material(&generated.cert.pem(), ""));
        assert!(matches!(result, Err(TlsError::PrivateKey(_))));
    }

    #[test]
    fn load_reports_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CERT_FILE), "cert").unwrap();
        match TlsMaterial::load(dir.path()) {
            Err(TlsError::Read { path, .. }) => assert!(path.ends_with(KEY_FILE)),
            other => panic!("expected missing key error, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CERT_FILE), "c").unwrap();
        std::fs::write(dir.path().join(KEY_FILE), "k").unwrap();
        let m = TlsMaterial::load(dir.path()).unwrap();
        assert_eq!(m.cert_pem, "c");
        assert_eq!(m.key_pem, "k");
        assert!(format!("{m:?}").contains("REDACTED"));
    }
}
