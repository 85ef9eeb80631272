//! Storage abstraction and implementations for evolution history.
//!
//! This crate provides a trait-based history interface with a JSON file
//! implementation for production and an in-memory one for tests.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;
pub mod locks;

pub use trait_::{HistoryStorage, HistoryDocument, StorageError, Result};
pub use json_storage::JsonHistoryStorage;
pub use memory::MemoryHistoryStorage;
pub use locks::{DomainLocks, DomainGuard};
