//! etcd backend over the v3 gRPC API.
//!
//! The client is async-only; the store owns a current-thread runtime and
//! blocks on each call so that callers see a synchronous [`KvStore`].

use etcd_client::{
    Certificate, Client, ConnectOptions, DeleteOptions, GetOptions, Identity, TlsOptions,
};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, instrument};

use crate::domain::{directory_prefix, immediate_children, Backend, ConnectionParams, KvPair};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::tls::TlsMaterial;
use crate::infrastructure::traits::KvStore;

const BACKEND: Backend = Backend::Etcd;

/// Store handle on an etcd cluster.
pub struct EtcdStore {
    runtime: Runtime,
    client: Client,
}

impl std::fmt::Debug for EtcdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtcdStore").finish_non_exhaustive()
    }
}

impl EtcdStore {
    pub fn connect(params: &ConnectionParams, tls: Option<&TlsMaterial>) -> InfraResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| InfraError::connect(BACKEND, e))?;

        let mut options = ConnectOptions::new()
            .with_connect_timeout(params.timeout)
            .with_timeout(params.timeout);
        let scheme = match tls {
            Some(tls) => {
                options = options.with_tls(
                    TlsOptions::new()
                        .ca_certificate(Certificate::from_pem(&tls.ca_pem))
                        .identity(Identity::from_pem(&tls.cert_pem, &tls.key_pem)),
                );
                "https"
            }
            None => "http",
        };
        let endpoints = endpoints(scheme, &params.addresses);
        debug!("etcd endpoints: {:?}", endpoints);

        let client = runtime
            .block_on(Client::connect(endpoints, Some(options)))
            .map_err(|e| InfraError::connect(BACKEND, e))?;
        Ok(Self { runtime, client })
    }

    /// `etcd_client::Client` is a cheap handle; each call works on a clone
    /// so the trait can take `&self`.
    fn client(&self) -> Client {
        self.client.clone()
    }
}

fn endpoints(scheme: &str, addresses: &[String]) -> Vec<String> {
    addresses
        .iter()
        .map(|a| {
            if a.contains("://") {
                a.clone()
            } else {
                format!("{}://{}", scheme, a)
            }
        })
        .collect()
}

impl KvStore for EtcdStore {
    #[instrument(level = "debug", skip(self, value))]
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        let mut client = self.client();
        self.runtime
            .block_on(client.put(key, value.to_vec(), None))
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn get(&self, key: &str) -> InfraResult<KvPair> {
        let mut client = self.client();
        let resp = self
            .runtime
            .block_on(client.get(key, None))
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        resp.kvs()
            .first()
            .map(|kv| KvPair::new(String::from_utf8_lossy(kv.key()), kv.value()))
            .ok_or_else(|| InfraError::KeyNotFound(key.to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, key: &str) -> InfraResult<()> {
        let mut client = self.client();
        let resp = self
            .runtime
            .block_on(client.delete(key, None))
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        if resp.deleted() == 0 {
            return Err(InfraError::KeyNotFound(key.to_string()));
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        for (key, whole_range) in subtree_ranges(prefix) {
            let mut client = self.client();
            let options = whole_range.then(|| DeleteOptions::new().with_prefix());
            let resp = self
                .runtime
                .block_on(client.delete(key.as_str(), options))
                .map_err(|e| InfraError::backend(BACKEND, e))?;
            debug!("etcd deleted {} keys for {:?}", resp.deleted(), key);
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        let prefix = directory_prefix(directory);
        let mut client = self.client();
        let resp = self
            .runtime
            .block_on(client.get(prefix.as_str(), Some(GetOptions::new().with_prefix())))
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        if resp.kvs().is_empty() {
            return Err(InfraError::KeyNotFound(directory.to_string()));
        }

        let pairs = resp
            .kvs()
            .iter()
            .map(|kv| KvPair::new(String::from_utf8_lossy(kv.key()), kv.value()));
        Ok(immediate_children(&prefix, pairs))
    }
}

/// Delete requests covering `prefix` and its descendants as `(key, is_range)`.
///
/// A bare prefix range would also match siblings (`app` covers `apple`), so
/// the key itself is deleted exactly and the range starts at `prefix/`. The
/// empty prefix ranges over the whole keyspace.
fn subtree_ranges(prefix: &str) -> Vec<(String, bool)> {
    if prefix.is_empty() {
        return vec![(String::new(), true)];
    }
    let below = directory_prefix(prefix);
    let key = prefix.trim_end_matches('/');
    if key.is_empty() {
        return vec![(below, true)];
    }
    vec![(key.to_string(), false), (below, true)]
}
