//! Metadata store implementations of the stored query execution steps.
//!
//! # Available Backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`InMemoryMetadataStore`] | Fixture-loaded store for tests and local runs |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use helios_storedquery::backends::InMemoryMetadataStore;
//! use helios_storedquery::StoredQueryRegistry;
//!
//! let store = Arc::new(InMemoryMetadataStore::new());
//! let registry = StoredQueryRegistry::with_store(store).unwrap();
//! assert!(registry.resolve("GetFolderAndContents").is_some());
//! ```

pub mod memory;

pub use memory::{InMemoryMetadataStore, RegistryFixture};
