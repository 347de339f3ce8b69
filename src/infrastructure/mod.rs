//! Infrastructure layer: backend clients, TLS material, I/O boundary traits
//!
//! This layer implements the I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod stores;
pub mod tls;
pub mod traits;

pub use error::{InfraError, InfraResult};
