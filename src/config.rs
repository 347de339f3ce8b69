//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>`, else `$XDG_CONFIG_HOME/kviator/kviator.toml`
//! 3. Environment variables: `KVIATOR_*` prefix
//! 4. Command line flags

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, ConnectionParams, DomainResult, TlsFiles};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "KVIATOR";

/// TLS file locations. TLS is used only when all three are set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TlsSettings {
    pub ca_cert: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
}

impl TlsSettings {
    /// All three files, or `None` when any of them is unset or empty.
    pub fn files(&self) -> Option<TlsFiles> {
        let set = |p: &Option<PathBuf>| p.clone().filter(|p| !p.as_os_str().is_empty());
        match (
            set(&self.ca_cert),
            set(&self.client_cert),
            set(&self.client_key),
        ) {
            (Some(ca_cert), Some(client_cert), Some(client_key)) => Some(TlsFiles {
                ca_cert,
                client_cert,
                client_key,
            }),
            (None, None, None) => None,
            _ => {
                warn!("TLS needs --ca-cert, --client-cert and --client-key together; connecting without TLS");
                None
            }
        }
    }

    /// Merge overlay onto self: overlay wins where it is set.
    fn merge(&self, overlay: &TlsSettings) -> Self {
        Self {
            ca_cert: overlay.ca_cert.clone().or_else(|| self.ca_cert.clone()),
            client_cert: overlay
                .client_cert
                .clone()
                .or_else(|| self.client_cert.clone()),
            client_key: overlay
                .client_key
                .clone()
                .or_else(|| self.client_key.clone()),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub kvstore: Option<String>,
    pub client: Option<Vec<String>>,
    pub show_value: Option<bool>,
    pub tls: TlsSettings,
}

/// Unified configuration for kviator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Backend name: consul, etcd or zookeper
    pub kvstore: Option<String>,
    /// Server addresses (host:port)
    pub client: Vec<String>,
    /// Print `key=value` in list output
    pub show_value: bool,
    /// TLS material
    pub tls: TlsSettings,
}

/// Get the XDG config directory for kviator.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kviator").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("kviator.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence, without command line flags.
    ///
    /// An explicit `config_file` must exist; the global file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                debug!("loading config from {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("loading global config from {}", global_path.display());
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = current.apply_env_overrides(env_source())?;
        current.expand_paths();
        Ok(current)
    }

    /// Merge overlay config onto self (base); overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            kvstore: overlay.kvstore.clone().or_else(|| self.kvstore.clone()),
            client: overlay
                .client
                .clone()
                .unwrap_or_else(|| self.client.clone()),
            show_value: overlay.show_value.unwrap_or(self.show_value),
            tls: self.tls.merge(&overlay.tls),
        }
    }

    /// Apply `KVIATOR_*` variables from `env` as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<String>(&config, "kvstore") {
            self.kvstore = Some(val);
        }
        if let Some(val) = env_value::<Vec<String>>(&config, "client") {
            self.client = val;
        }
        if let Some(val) = env_value::<bool>(&config, "show_value") {
            self.show_value = val;
        }
        if let Some(val) = env_value::<PathBuf>(&config, "tls.ca_cert") {
            self.tls.ca_cert = Some(val);
        }
        if let Some(val) = env_value::<PathBuf>(&config, "tls.client_cert") {
            self.tls.client_cert = Some(val);
        }
        if let Some(val) = env_value::<PathBuf>(&config, "tls.client_key") {
            self.tls.client_key = Some(val);
        }
        Ok(self)
    }

    /// Expand `~` and `$VAR` in TLS paths.
    fn expand_paths(&mut self) {
        for path in [
            &mut self.tls.ca_cert,
            &mut self.tls.client_cert,
            &mut self.tls.client_key,
        ]
        .into_iter()
        .flatten()
        {
            *path = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
        }
    }

    /// Validate the selected backend and addresses into connection parameters.
    pub fn connection_params(&self) -> DomainResult<ConnectionParams> {
        ConnectionParams::new(self.kvstore.as_deref(), &self.client, self.tls.files())
    }
}

/// Read one override; an unset key is `None`, an unparsable one is logged
/// and ignored.
fn env_value<T: serde::de::DeserializeOwned>(config: &Config, key: &str) -> Option<T> {
    match config.get::<T>(key) {
        Ok(val) => Some(val),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => {
            warn!(
                "ignoring {}_{}: {}",
                ENV_PREFIX,
                key.to_uppercase().replace('.', "__"),
                e
            );
            None
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("client")
        .try_parsing(true)
}
