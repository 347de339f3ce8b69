//! Application services

pub mod kv;

pub use kv::KvService;
