//! Domain layer: entities and invocation rules
//!
//! This layer is independent of external concerns (no network, no CLI, no config loading).

pub mod entities;
pub mod error;

pub use entities::*;
pub use error::{DomainError, DomainResult};
