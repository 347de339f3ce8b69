//! Tests for KvService

mod common;

use kviator::application::services::KvService;
use kviator::application::ApplicationError;
use kviator::domain::{Backend, KvPair};
use kviator::infrastructure::traits::KvStore;
use kviator::infrastructure::{InfraError, InfraResult};
use kviator::util::testing;

use common::MemoryStore;

/// Store whose reads fail with a transport error; writes are recorded.
#[derive(Default)]
struct FlakyReads {
    inner: MemoryStore,
}

impl KvStore for FlakyReads {
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        self.inner.put(key, value)
    }

    fn get(&self, _key: &str) -> InfraResult<KvPair> {
        Err(InfraError::backend(Backend::Etcd, "deadline exceeded"))
    }

    fn delete(&self, key: &str) -> InfraResult<()> {
        self.inner.delete(key)
    }

    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        self.inner.delete_tree(prefix)
    }

    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        self.inner.list(directory)
    }
}

#[test]
fn given_stored_bytes_when_getting_then_returns_them_unchanged() {
    // Arrange
    let service = KvService::new(Box::new(MemoryStore::new()));
    let value = [0u8, 159, 146, 150, b'\n'];

    // Act
    service.put("bin", &value).unwrap();
    let pair = service.get("bin").unwrap();

    // Assert
    assert_eq!(pair.value, value);
}

#[test]
fn given_missing_key_when_getting_then_store_not_found() {
    let service = KvService::new(Box::new(MemoryStore::new()));

    let err = service.get("nope").unwrap_err();

    assert!(matches!(err, ApplicationError::Store(ref e) if e.is_not_found()));
}

#[test]
fn given_present_key_when_cas_then_key_already_set() {
    let service = KvService::new(Box::new(MemoryStore::with(&[("k", "old")])));

    let err = service.cas("k", b"new").unwrap_err();

    assert!(matches!(err, ApplicationError::KeyAlreadySet(ref k) if k == "k"));
    assert_eq!(service.get("k").unwrap().value, b"old");
}

#[test]
fn given_failing_probe_when_cas_then_treated_as_absent_and_written() {
    testing::init_test_setup();
    let service = KvService::new(Box::new(FlakyReads::default()));

    service.cas("k", b"v").unwrap();
}

#[test]
fn given_failing_probe_when_exists_then_false() {
    let service = KvService::new(Box::new(FlakyReads::default()));

    assert!(!service.exists("k"));
}

#[test]
fn given_nested_keys_when_listing_then_direct_children_and_directories() {
    let service = KvService::new(Box::new(MemoryStore::with(&[
        ("cfg/a", "1"),
        ("cfg/sub/b", "2"),
        ("cfg/z", "3"),
    ])));

    let keys: Vec<String> = service
        .list("cfg")
        .unwrap()
        .into_iter()
        .map(|p| p.key)
        .collect();

    assert_eq!(keys, vec!["cfg/a", "cfg/sub", "cfg/z"]);
}

#[test]
fn given_root_when_delete_tree_then_everything_removed() {
    let store = MemoryStore::with(&[("a", "1"), ("b/c", "2")]);
    let service = KvService::new(Box::new(store));

    service.delete_tree("").unwrap();

    assert!(service.list("").is_err());
}
