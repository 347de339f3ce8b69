//! Key/value command service
//!
//! One method per command. Each call is a single operation against the store.

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::KvPair;
use crate::infrastructure::traits::KvStore;

/// Service running the seven kviator operations against one store handle.
pub struct KvService {
    store: Box<dyn KvStore>,
}

impl KvService {
    /// Create a new service over an open store.
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Write unconditionally.
    #[instrument(level = "debug", skip(self, value), fields(len = value.len()))]
    pub fn put(&self, key: &str, value: &[u8]) -> ApplicationResult<()> {
        Ok(self.store.put(key, value)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn get(&self, key: &str) -> ApplicationResult<KvPair> {
        Ok(self.store.get(key)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, key: &str) -> ApplicationResult<()> {
        Ok(self.store.delete(key)?)
    }

    /// Remove a subtree. `root` is the backend path; the empty string is the
    /// store root (see [`crate::domain::subtree_root`]).
    #[instrument(level = "debug", skip(self))]
    pub fn delete_tree(&self, root: &str) -> ApplicationResult<()> {
        Ok(self.store.delete_tree(root)?)
    }

    /// Immediate children of `directory`, in backend order.
    #[instrument(level = "debug", skip(self))]
    pub fn list(&self, directory: &str) -> ApplicationResult<Vec<KvPair>> {
        let pairs = self.store.list(directory)?;
        debug!("list: {} children", pairs.len());
        Ok(pairs)
    }

    /// Write only if `key` is currently absent.
    ///
    /// Presence is all that is checked; the existing value is never compared.
    /// A failed probe counts as absent, so the write is attempted.
    #[instrument(level = "debug", skip(self, value), fields(len = value.len()))]
    pub fn cas(&self, key: &str, value: &[u8]) -> ApplicationResult<()> {
        match self.store.exists(key) {
            Ok(true) => return Err(ApplicationError::KeyAlreadySet(key.to_string())),
            Ok(false) => {}
            Err(e) => debug!("cas: presence probe failed, treating as absent: {}", e),
        }
        Ok(self.store.put(key, value)?)
    }

    /// True iff the key can be read. Any probe failure counts as absent.
    #[instrument(level = "debug", skip(self))]
    pub fn exists(&self, key: &str) -> bool {
        self.store.exists(key).unwrap_or_else(|e| {
            debug!("exists: probe failed, treating as absent: {}", e);
            false
        })
    }
}
