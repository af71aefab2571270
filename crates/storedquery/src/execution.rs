//! The pluggable execution step of a stored query.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::types::QueryResult;

/// Runs a parsed stored query against a metadata store.
///
/// Each query variant defines its own parameter record `P`; a store supports
/// a variant by implementing `ExecutionStep<P>` for that record. The pipeline
/// calls [`execute`](ExecutionStep::execute) exactly once per successful run
/// and never after a validation or internal failure.
///
/// # Errors
///
/// * `BackendError::Unavailable` - the store cannot be reached
/// * `BackendError::NotFound` - the target entity does not exist
/// * `BackendError::QueryError` - the query cannot be satisfied
#[async_trait]
pub trait ExecutionStep<P>: Send + Sync
where
    P: Send + 'static,
{
    /// Executes the query described by `params`.
    async fn execute(&self, params: P) -> BackendResult<QueryResult>;
}

