//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod services;
pub mod value;

pub use error::{ApplicationError, ApplicationResult};
pub use value::{resolve_value, STDIN_MARKER};
