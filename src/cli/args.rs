//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::{RawSettings, TlsSettings};

const STDIN_NOTE: &str = "\
The value can also be read from stdin by passing - as the value:

    cmd | kviator ... put <key> -
    kviator ... put <key> - < val.file

Without the -, stdin is ignored.";

/// Single-shot key/value client for Consul, etcd and ZooKeeper
///
/// Options go before the command; every word after it is an operand.
#[derive(Parser, Debug)]
#[command(name = "kviator")]
#[command(author, version, about, long_about = None)]
#[command(after_long_help = STDIN_NOTE)]
pub struct Cli {
    /// The kvstore to connect to: consul, etcd or zookeper
    #[arg(long, value_name = "KVSTORE")]
    pub kvstore: Option<String>,

    /// Address of the kvstore, e.g. localhost:8500 (comma separated for several)
    #[arg(long, value_name = "ADDR", value_delimiter = ',')]
    pub client: Vec<String>,

    /// Show the value when using the list command
    #[arg(long)]
    pub show_value: bool,

    /// CA certificate to use for TLS
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub ca_cert: Option<PathBuf>,

    /// Client certificate to use for TLS authentication
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub client_cert: Option<PathBuf>,

    /// Client key to use for TLS authentication
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub client_key: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/kviator/kviator.toml)
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-d, -dd, -ddd)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Flags that were given, as an overlay for [`crate::config::Settings`].
    pub fn overrides(&self) -> RawSettings {
        RawSettings {
            kvstore: self.kvstore.clone(),
            client: (!self.client.is_empty()).then(|| self.client.clone()),
            show_value: self.show_value.then_some(true),
            tls: TlsSettings {
                ca_cert: self.ca_cert.clone(),
                client_cert: self.client_cert.clone(),
                client_key: self.client_key.clone(),
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Put a key value pair in the kvstore
    Put(KeyValueArgs),

    /// Retrieve the value of a key from the kvstore
    Get(KeyArgs),

    /// Remove a key value pair from the kvstore
    Del(KeyArgs),

    /// Remove an entire tree structure from the kvstore (use / for all)
    Deltree(KeyArgs),

    /// List the keys directly below a key
    List(KeyArgs),

    /// Put a key value pair only when the key is not set yet
    Cas(KeyValueArgs),

    /// Print true when the key exists
    Exists(KeyArgs),

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// The key
    pub key: Option<String>,
}

impl KeyArgs {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or_default()
    }
}

#[derive(Args, Debug, Clone)]
pub struct KeyValueArgs {
    /// The key
    pub key: Option<String>,

    /// The value; several words are joined with spaces, - reads stdin
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub value: Vec<String>,
}

impl KeyValueArgs {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or_default()
    }
}
