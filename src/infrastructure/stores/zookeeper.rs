//! ZooKeeper backend.

use tracing::{debug, instrument, warn};
use zookeeper::{Acl, CreateMode, WatchedEvent, Watcher, ZkError, ZooKeeper, ZooKeeperExt};

use crate::domain::{Backend, ConnectionParams, KvPair};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::tls::TlsMaterial;
use crate::infrastructure::traits::KvStore;

const BACKEND: Backend = Backend::ZooKeeper;

/// Node reserved by ZooKeeper itself; never removed by a root `deltree`.
const RESERVED_NODE: &str = "zookeeper";

/// Session watcher that only logs state changes.
struct SessionLogger;

impl Watcher for SessionLogger {
    fn handle(&self, event: WatchedEvent) {
        debug!("zookeeper session event: {:?}", event);
    }
}

/// Store handle on a ZooKeeper ensemble.
pub struct ZooKeeperStore {
    zk: ZooKeeper,
}

impl std::fmt::Debug for ZooKeeperStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZooKeeperStore").finish_non_exhaustive()
    }
}

impl ZooKeeperStore {
    pub fn connect(params: &ConnectionParams, tls: Option<&TlsMaterial>) -> InfraResult<Self> {
        if tls.is_some() {
            warn!("zookeeper client has no TLS support, connecting without TLS");
        }
        let connect_string = params.addresses.join(",");
        debug!("zookeeper ensemble: {}", connect_string);
        let zk = ZooKeeper::connect(&connect_string, params.timeout, SessionLogger)
            .map_err(|e| InfraError::connect(BACKEND, format!("{:?}", e)))?;
        Ok(Self { zk })
    }

    fn create_or_set(&self, path: &str, value: &[u8]) -> Result<(), ZkError> {
        if self.zk.exists(path, false)?.is_some() {
            self.zk.set_data(path, value.to_vec(), None)?;
            return Ok(());
        }
        if let Some(parent) = parent_path(path) {
            self.zk.ensure_path(parent)?;
        }
        match self.zk.create(
            path,
            value.to_vec(),
            Acl::open_unsafe().clone(),
            CreateMode::Persistent,
        ) {
            Ok(_) => Ok(()),
            // created concurrently between the probe and the create
            Err(ZkError::NodeExists) => self.zk.set_data(path, value.to_vec(), None).map(|_| ()),
            Err(e) => Err(e),
        }
    }
}

/// ZooKeeper paths are absolute and carry no trailing slash.
fn normalize(key: &str) -> String {
    format!("/{}", key.trim_matches('/'))
}

fn parent_path(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

fn child_path(parent: &str, child: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), child)
}

fn zk_error(key: &str, err: ZkError) -> InfraError {
    match err {
        ZkError::NoNode => InfraError::KeyNotFound(key.to_string()),
        other => InfraError::backend(BACKEND, format!("{:?}", other)),
    }
}

impl KvStore for ZooKeeperStore {
    #[instrument(level = "debug", skip(self, value))]
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        self.create_or_set(&normalize(key), value)
            .map_err(|e| zk_error(key, e))
    }

    #[instrument(level = "debug", skip(self))]
    fn get(&self, key: &str) -> InfraResult<KvPair> {
        let (data, _stat) = self
            .zk
            .get_data(&normalize(key), false)
            .map_err(|e| zk_error(key, e))?;
        Ok(KvPair::new(key, data))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, key: &str) -> InfraResult<()> {
        self.zk
            .delete(&normalize(key), None)
            .map_err(|e| zk_error(key, e))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        let path = normalize(prefix);
        if path != "/" {
            return self.zk.delete_recursive(&path).map_err(|e| zk_error(prefix, e));
        }
        let children = self.zk.get_children("/", false).map_err(|e| zk_error(prefix, e))?;
        for child in children.iter().filter(|c| c.as_str() != RESERVED_NODE) {
            self.zk
                .delete_recursive(&child_path("/", child))
                .map_err(|e| zk_error(child, e))?;
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        let path = normalize(directory);
        let children = self
            .zk
            .get_children(&path, false)
            .map_err(|e| zk_error(directory, e))?;

        let mut pairs = Vec::with_capacity(children.len());
        for child in children {
            match self.zk.get_data(&child_path(&path, &child), false) {
                Ok((data, _)) => pairs.push(KvPair::new(child_path(directory, &child), data)),
                // removed between listing and reading
                Err(ZkError::NoNode) => continue,
                Err(e) => return Err(zk_error(&child, e)),
            }
        }
        Ok(pairs)
    }
}
