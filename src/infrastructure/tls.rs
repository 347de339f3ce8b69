//! TLS material loading for mutually authenticated backend connections.

use std::path::Path;

use tracing::debug;

use crate::domain::TlsFiles;
use crate::infrastructure::error::{InfraError, InfraResult};

const PEM_MARKER: &str = "-----BEGIN ";

/// PEM contents of a CA certificate and a client identity.
#[derive(Clone)]
pub struct TlsMaterial {
    pub ca_pem: Vec<u8>,
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca_pem", &self.ca_pem.len())
            .field("cert_pem", &self.cert_pem.len())
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

impl TlsMaterial {
    /// Read and sanity-check all three PEM files.
    pub fn load(files: &TlsFiles) -> InfraResult<Self> {
        debug!(
            "loading TLS material: ca={}, cert={}, key={}",
            files.ca_cert.display(),
            files.client_cert.display(),
            files.client_key.display()
        );
        Ok(Self {
            ca_pem: read_pem(&files.ca_cert)?,
            cert_pem: read_pem(&files.client_cert)?,
            key_pem: read_pem(&files.client_key)?,
        })
    }

    /// Client certificate followed by its key, as one PEM bundle.
    pub fn identity_pem(&self) -> Vec<u8> {
        let mut bundle = Vec::with_capacity(self.cert_pem.len() + self.key_pem.len() + 1);
        bundle.extend_from_slice(&self.cert_pem);
        if !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(&self.key_pem);
        bundle
    }
}

fn read_pem(path: &Path) -> InfraResult<Vec<u8>> {
    let data = std::fs::read(path).map_err(|source| InfraError::TlsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let looks_like_pem = std::str::from_utf8(&data)
        .map(|s| s.contains(PEM_MARKER))
        .unwrap_or(false);
    if !looks_like_pem {
        return Err(InfraError::TlsMaterial {
            path: path.to_path_buf(),
            message: "no PEM block found".into(),
        });
    }
    Ok(data)
}
