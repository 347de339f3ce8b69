//! In-memory test doubles for the store and stdin boundaries.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use kviator::config::Settings;
use kviator::domain::{directory_prefix, immediate_children, Backend, ConnectionParams, KvPair};
use kviator::infrastructure::di::ServiceContainer;
use kviator::infrastructure::traits::{InputSource, KvStore, StoreConnector};
use kviator::infrastructure::{InfraError, InfraResult};

/// Ordered in-memory key/value store.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes are rejected by the "backend".
    pub fn read_only() -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
            fail_writes: true,
        }
    }

    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let store = Self::new();
        for (k, v) in pairs {
            store
                .data
                .lock()
                .unwrap()
                .insert(k.to_string(), v.as_bytes().to_vec());
        }
        store
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap()
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.lock().unwrap().keys().cloned().collect()
    }
}

impl KvStore for MemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        if self.fail_writes {
            return Err(InfraError::backend(Backend::Consul, "permission denied"));
        }
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> InfraResult<KvPair> {
        self.data
            .lock()
            .unwrap()
            .get(key)
            .map(|v| KvPair::new(key, v.clone()))
            .ok_or_else(|| InfraError::KeyNotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> InfraResult<()> {
        self.data
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| InfraError::KeyNotFound(key.to_string()))
    }

    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        let mut data = self.data.lock().unwrap();
        if prefix.is_empty() {
            data.clear();
            return Ok(());
        }
        let below = directory_prefix(prefix);
        data.retain(|k, _| k != prefix && !k.starts_with(&below));
        Ok(())
    }

    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        let prefix = directory_prefix(directory);
        let below: Vec<KvPair> = self
            .data
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| KvPair::new(k.clone(), v.clone()))
            .collect();
        if below.is_empty() {
            return Err(InfraError::KeyNotFound(directory.to_string()));
        }
        Ok(immediate_children(&prefix, below))
    }
}

/// Handle the connector gives out; all handles share one store.
struct SharedStore(Arc<MemoryStore>);

impl KvStore for SharedStore {
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        self.0.put(key, value)
    }

    fn get(&self, key: &str) -> InfraResult<KvPair> {
        self.0.get(key)
    }

    fn delete(&self, key: &str) -> InfraResult<()> {
        self.0.delete(key)
    }

    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        self.0.delete_tree(prefix)
    }

    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        self.0.list(directory)
    }
}

/// Connector handing out the shared memory store and counting connections.
pub struct MemoryConnector {
    pub store: Arc<MemoryStore>,
    connects: AtomicUsize,
    refuse: bool,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            connects: AtomicUsize::new(0),
            refuse: false,
        }
    }

    /// Connector whose backend is unreachable.
    pub fn unreachable() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            connects: AtomicUsize::new(0),
            refuse: true,
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, params: &ConnectionParams) -> InfraResult<Box<dyn KvStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(InfraError::connect(params.backend, "connection refused"));
        }
        Ok(Box::new(SharedStore(self.store.clone())))
    }
}

/// Scripted stdin: `None` behaves like a terminal.
pub struct ScriptedInput(pub Option<Vec<u8>>);

impl ScriptedInput {
    pub fn terminal() -> Self {
        Self(None)
    }

    pub fn piped(data: &str) -> Self {
        Self(Some(data.as_bytes().to_vec()))
    }
}

impl InputSource for ScriptedInput {
    fn is_terminal(&self) -> bool {
        self.0.is_none()
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.0.clone().unwrap_or_default())
    }
}

/// Settings selecting `backend` on a dummy address.
pub fn settings(backend: &str) -> Settings {
    Settings {
        kvstore: Some(backend.to_string()),
        client: vec!["127.0.0.1:8500".to_string()],
        ..Settings::default()
    }
}

/// Container over a connector and scripted stdin.
pub fn container(
    settings: Settings,
    connector: Arc<MemoryConnector>,
    input: ScriptedInput,
) -> ServiceContainer {
    ServiceContainer::with_deps(settings, connector, Arc::new(input))
}
