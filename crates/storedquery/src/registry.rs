//! Stored query registry.
//!
//! Maps stored query names and query ids to runnable handlers so a transport
//! layer can dispatch a request without knowing the variant's types.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ConfigurationError, RegistryError, StoredQueryResult};
use crate::execution::ExecutionStep;
use crate::params::ParameterBag;
use crate::pipeline::{StoredQueryHandler, StoredQueryPipeline};
use crate::types::QueryResult;
use crate::variants::{
    DocumentsParams, FolderAndContentsParams, FoldersParams, GetDocuments, GetFolderAndContents,
    GetFolders,
};

/// In-memory registry of stored query handlers.
#[derive(Default)]
pub struct StoredQueryRegistry {
    handlers: Vec<Arc<dyn StoredQueryHandler>>,
    by_key: HashMap<String, usize>,
}

impl StoredQueryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry of every bundled variant over one store.
    pub fn with_store<S>(store: Arc<S>) -> Result<Self, ConfigurationError>
    where
        S: ExecutionStep<FolderAndContentsParams>
            + ExecutionStep<FoldersParams>
            + ExecutionStep<DocumentsParams>
            + 'static,
    {
        let mut registry = Self::new();
        let handlers: Vec<Arc<dyn StoredQueryHandler>> = vec![
            Arc::new(StoredQueryPipeline::new(
                GetFolderAndContents::new()?,
                Arc::clone(&store),
            )),
            Arc::new(StoredQueryPipeline::new(GetFolders::new()?, Arc::clone(&store))),
            Arc::new(StoredQueryPipeline::new(GetDocuments::new()?, store)),
        ];
        for handler in handlers {
            registry.register(handler).map_err(|e| match e {
                RegistryError::Duplicate { key } | RegistryError::UnknownQuery { key } => {
                    ConfigurationError::DuplicateQuery { key }
                }
            })?;
        }
        info!(queries = registry.len(), "Stored query registry initialized");
        Ok(registry)
    }

    /// Registers a handler under its name and query id.
    pub fn register(&mut self, handler: Arc<dyn StoredQueryHandler>) -> Result<(), RegistryError> {
        for key in [handler.name(), handler.query_id()] {
            if self.by_key.contains_key(key) {
                return Err(RegistryError::Duplicate {
                    key: key.to_string(),
                });
            }
        }

        let index = self.handlers.len();
        self.by_key.insert(handler.name().to_string(), index);
        self.by_key.insert(handler.query_id().to_string(), index);
        debug!(query = %handler.name(), query_id = %handler.query_id(), "Registered stored query");
        self.handlers.push(handler);
        Ok(())
    }

    /// Looks up a handler by stored query name or query id.
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn StoredQueryHandler>> {
        self.by_key
            .get(key)
            .map(|&index| Arc::clone(&self.handlers[index]))
    }

    /// Runs the stored query registered under `key`.
    pub async fn run(&self, key: &str, bag: &mut ParameterBag) -> StoredQueryResult<QueryResult> {
        let handler = self.resolve(key).ok_or_else(|| RegistryError::UnknownQuery {
            key: key.to_string(),
        })?;
        handler.run(bag).await
    }

    /// Returns the registered stored query names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.name())
    }

    /// Returns the number of registered stored queries.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for StoredQueryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredQueryRegistry")
            .field("queries", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
