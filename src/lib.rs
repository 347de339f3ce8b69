//! kviator: single-shot key/value client for Consul, etcd and ZooKeeper.
//!
//! Layering follows the dependency direction
//! `cli` → `application` → `domain`, with `infrastructure` providing the
//! backend clients behind the [`infrastructure::traits::KvStore`] trait.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
