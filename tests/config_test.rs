//! Integration tests for Settings loading and flag precedence.
//!
//! Precedence (lowest to highest): defaults, config file, KVIATOR_* env, flags.
//! These tests use explicit config files in temp directories only.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tempfile::TempDir;

use kviator::application::ApplicationError;
use kviator::cli::Cli;
use kviator::config::Settings;
use kviator::domain::{Backend, DomainError};

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("kviator.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn given_config_file_when_load_then_reads_all_sections() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
kvstore = "etcd"
client = ["10.0.0.1:2379", "10.0.0.2:2379"]
show_value = true

[tls]
ca_cert = "/certs/ca.pem"
client_cert = "/certs/client.pem"
client_key = "/certs/client-key.pem"
"#,
    );

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.kvstore.as_deref(), Some("etcd"));
    assert_eq!(settings.client, vec!["10.0.0.1:2379", "10.0.0.2:2379"]);
    assert!(settings.show_value);
    let tls = settings.tls.files().expect("complete TLS triple");
    assert_eq!(tls.ca_cert, PathBuf::from("/certs/ca.pem"));

    let params = settings.connection_params().unwrap();
    assert_eq!(params.backend, Backend::Etcd);
    assert_eq!(params.addresses.len(), 2);
    assert!(params.tls.is_some());
}

#[test]
fn given_partial_config_when_load_then_defaults_fill_the_rest() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "kvstore = \"consul\"\n");

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.kvstore.as_deref(), Some("consul"));
    assert!(settings.client.is_empty());
    assert!(!settings.show_value);
    assert_eq!(settings.tls.files(), None);
    assert_eq!(
        settings.connection_params().unwrap_err(),
        DomainError::MissingAddress
    );
}

#[test]
fn given_missing_explicit_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_malformed_config_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "kvstore = [unclosed\n");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(err.to_string().contains("kviator.toml"));
}

#[test]
fn given_flags_when_merging_then_flags_override_config_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
kvstore = "consul"
client = ["file:8500"]
"#,
    );
    let cli = Cli::try_parse_from([
        "kviator",
        "--kvstore",
        "zookeper",
        "--show-value",
        "list",
        "app",
    ])
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path))
        .unwrap()
        .merge_with(&cli.overrides());

    // Assert
    assert_eq!(settings.kvstore.as_deref(), Some("zookeper"));
    assert_eq!(settings.client, vec!["file:8500"]);
    assert!(settings.show_value);
}

#[test]
fn given_unknown_backend_in_config_when_building_params_then_unknown_backend() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "kvstore = \"zookeeper\"\nclient = [\"zk:2181\"]\n");

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(
        settings.connection_params().unwrap_err(),
        DomainError::UnknownBackend("zookeeper".into())
    );
}
