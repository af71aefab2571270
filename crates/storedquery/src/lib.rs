//! Helios Stored Query Engine
//!
//! This crate implements the parameter validation and execution pipeline
//! shared by the stored query handlers of an IHE XDS.b document registry.
//! Every stored query runs the same three phases:
//!
//! 1. **Validate** the named, multi-valued parameters against a declarative
//!    [`ConstraintTable`] (required-ness, cardinality, value typing, coded
//!    values, AND/OR legality, alternative parameters)
//! 2. **Parse** the validated values into a typed record, applying documented
//!    defaults
//! 3. **Execute** the typed query through a pluggable [`ExecutionStep`]
//!
//! # Architecture
//!
//! - [`params`] - The decoded request parameters
//! - [`constraints`] - Per-query rule tables
//! - [`validator`] - Table interpreter collecting every violation
//! - [`pipeline`] - The validate/parse/execute template
//! - [`execution`] - The execution step capability
//! - [`variants`] - Bundled stored queries
//! - [`registry`] - Dispatch by query name or id
//! - [`backends`] - Metadata store implementations
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use helios_storedquery::backends::InMemoryMetadataStore;
//! use helios_storedquery::metadata::param;
//! use helios_storedquery::{ParameterBag, StoredQueryError, StoredQueryRegistry};
//!
//! # tokio_test::block_on(async {
//! let registry = StoredQueryRegistry::with_store(Arc::new(InMemoryMetadataStore::new())).unwrap();
//!
//! // Single-valued parameter supplied twice
//! let mut bag = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, ["urn:uuid:1", "urn:uuid:2"]);
//!
//! let err = registry.run("GetFolderAndContents", &mut bag).await.unwrap_err();
//! assert!(matches!(err, StoredQueryError::Validation(_)));
//! assert!(bag.has_errors());
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod codes;
pub mod constraints;
pub mod error;
pub mod execution;
pub mod metadata;
pub mod params;
pub mod pipeline;
pub mod registry;
pub mod types;
pub mod validator;
pub mod variants;

// Re-export commonly used types at crate root
pub use constraints::{ConstraintTable, ParameterRule};
pub use error::{
    BackendError, InternalError, StoredQueryError, StoredQueryResult, ValidationErrors,
    ViolatedRule,
};
pub use execution::ExecutionStep;
pub use params::{Combinator, ParameterBag};
pub use pipeline::{QueryVariant, StoredQueryHandler, StoredQueryPipeline};
pub use registry::StoredQueryRegistry;
pub use types::QueryResult;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
