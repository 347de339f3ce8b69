//! Backend store implementations and the factory selecting among them.

pub mod consul;
pub mod etcd;
pub mod zookeeper;

use tracing::{debug, instrument};

use crate::domain::{Backend, ConnectionParams};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::tls::TlsMaterial;
use crate::infrastructure::traits::{KvStore, StoreConnector};

pub use self::consul::ConsulStore;
pub use self::etcd::EtcdStore;
pub use self::zookeeper::ZooKeeperStore;

/// Connector opening real network-backed stores.
#[derive(Debug, Default)]
pub struct BackendConnector;

impl StoreConnector for BackendConnector {
    #[instrument(level = "debug", skip(self))]
    fn connect(&self, params: &ConnectionParams) -> InfraResult<Box<dyn KvStore>> {
        let tls = params.tls.as_ref().map(TlsMaterial::load).transpose()?;
        debug!(
            "connecting to {} at {:?} (tls: {})",
            params.backend,
            params.addresses,
            tls.is_some()
        );
        let store: Box<dyn KvStore> = match params.backend {
            Backend::Consul => Box::new(ConsulStore::connect(params, tls.as_ref())?),
            Backend::Etcd => Box::new(EtcdStore::connect(params, tls.as_ref())?),
            Backend::ZooKeeper => Box::new(ZooKeeperStore::connect(params, tls.as_ref())?),
        };
        Ok(store)
    }
}
