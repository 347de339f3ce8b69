//! I/O boundary traits for testability
//!
//! These traits abstract the key/value backends and standard input, allowing
//! commands to be tested with in-memory implementations.

use std::io::{self, IsTerminal, Read};

use crate::domain::{ConnectionParams, KvPair};
use crate::infrastructure::error::{InfraError, InfraResult};

/// Uniform operation set over Consul, etcd and ZooKeeper.
///
/// A missing key is reported as [`InfraError::KeyNotFound`].
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()>;

    /// Read the pair stored under `key`.
    fn get(&self, key: &str) -> InfraResult<KvPair>;

    /// Remove `key`.
    fn delete(&self, key: &str) -> InfraResult<()>;

    /// Remove `prefix` and everything below it. The empty prefix is the root.
    fn delete_tree(&self, prefix: &str) -> InfraResult<()>;

    /// Pairs exactly one level below `directory`, in backend order.
    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>>;

    /// Probe whether `key` is present.
    fn exists(&self, key: &str) -> InfraResult<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(InfraError::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Opens a store handle for the given parameters.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, params: &ConnectionParams) -> InfraResult<Box<dyn KvStore>>;
}

/// Source of piped value input.
pub trait InputSource: Send + Sync {
    /// True when input is an interactive terminal (nothing is piped).
    fn is_terminal(&self) -> bool;

    /// Read all remaining input.
    fn read_all(&self) -> io::Result<Vec<u8>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Process standard input.
#[derive(Debug, Default)]
pub struct StdinSource;

impl InputSource for StdinSource {
    fn is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    }
}
