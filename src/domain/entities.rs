//! Core domain types: backends, key/value pairs, connection parameters

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::{DomainError, DomainResult};

/// Timeout handed to every backend client when connecting.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Supported key/value backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Consul,
    Etcd,
    ZooKeeper,
}

impl Backend {
    /// Name accepted by `--kvstore`.
    ///
    /// The ZooKeeper spelling is kept as `zookeper` for compatibility with
    /// existing scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Consul => "consul",
            Backend::Etcd => "etcd",
            Backend::ZooKeeper => "zookeper",
        }
    }

    pub fn all() -> [Backend; 3] {
        [Backend::Consul, Backend::Etcd, Backend::ZooKeeper]
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::all()
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| DomainError::UnknownBackend(s.to_string()))
    }
}

/// A key together with its stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: String,
    pub value: Vec<u8>,
}

impl KvPair {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// PEM files for mutually authenticated TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// CA certificate; the only trust root for the server certificate
    pub ca_cert: PathBuf,
    /// Client certificate presented to the server
    pub client_cert: PathBuf,
    /// Private key of the client certificate
    pub client_key: PathBuf,
}

/// Everything needed to open one store handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub backend: Backend,
    pub addresses: Vec<String>,
    pub tls: Option<TlsFiles>,
    pub timeout: Duration,
}

impl ConnectionParams {
    /// Validate raw selections into connection parameters.
    ///
    /// An unset or unknown backend and an empty address list are rejected.
    pub fn new(
        backend: Option<&str>,
        addresses: &[String],
        tls: Option<TlsFiles>,
    ) -> DomainResult<Self> {
        let backend: Backend = match backend {
            Some(name) if !name.is_empty() => name.parse()?,
            _ => return Err(DomainError::MissingBackend),
        };
        let addresses: Vec<String> = addresses
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
        if addresses.is_empty() {
            return Err(DomainError::MissingAddress);
        }
        Ok(Self {
            backend,
            addresses,
            tls,
            timeout: CONNECTION_TIMEOUT,
        })
    }

    /// First configured address (backends that talk to a single agent use this).
    pub fn primary_address(&self) -> &str {
        // new() guarantees at least one address
        self.addresses.first().map(String::as_str).unwrap_or_default()
    }
}

/// Map a `deltree` argument to the subtree passed to the backend.
///
/// The empty argument is refused so that a forgotten operand never wipes the
/// store; the root has to be requested explicitly as `/`.
pub fn subtree_root(key: &str) -> DomainResult<&str> {
    match key {
        "" => Err(DomainError::EmptySubtree),
        "/" => Ok(""),
        other => Ok(other),
    }
}

/// Prefix under which the children of `directory` live.
pub fn directory_prefix(directory: &str) -> String {
    if directory.is_empty() || directory.ends_with('/') {
        directory.to_string()
    } else {
        format!("{}/", directory)
    }
}

/// Collapse a recursive listing under `prefix` into its direct children.
///
/// Deeper keys stand for the child directory they sit in. Each child is
/// listed once, in first-seen order, with an empty value unless the child
/// key itself is stored. The entry for `prefix` itself is dropped.
pub fn immediate_children(prefix: &str, pairs: impl IntoIterator<Item = KvPair>) -> Vec<KvPair> {
    let mut children: Vec<KvPair> = Vec::new();
    for pair in pairs {
        let Some(rest) = pair.key.strip_prefix(prefix) else {
            continue;
        };
        // directory-style entries (`app/dir/`) count as the child itself
        let rest = rest.trim_end_matches('/');
        let Some(name) = rest.split('/').next().filter(|n| !n.is_empty()) else {
            continue;
        };
        let is_leaf = !rest.contains('/');
        let key = format!("{}{}", prefix, name);

        match children.iter_mut().find(|c| c.key == key) {
            Some(existing) if is_leaf => existing.value = pair.value,
            Some(_) => {}
            None if is_leaf => children.push(KvPair::new(key, pair.value)),
            None => children.push(KvPair::new(key, Vec::new())),
        }
    }
    children
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Unresolvable input is returned as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
