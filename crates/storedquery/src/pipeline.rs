//! The validate → parse → execute template shared by every stored query.
//!
//! ```text
//! START ─▶ GUARD ─▶ VALIDATING ─▶ PARSING ─▶ EXECUTING ─▶ DONE
//!            │           │            │            │
//!            ▼           ▼            ▼            ▼
//!   ABORTED_INTERNAL ABORTED_INVALID ABORTED_INTERNAL  backend error
//! ```
//!
//! Only the constraint table, the parser and the execution step differ per
//! query variant; [`StoredQueryPipeline`] supplies the sequence.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::constraints::ConstraintTable;
use crate::error::{InternalError, StoredQueryError, StoredQueryResult};
use crate::execution::ExecutionStep;
use crate::params::ParameterBag;
use crate::types::QueryResult;
use crate::validator;

/// A stored query's parameter contract and parser.
pub trait QueryVariant: Send + Sync + 'static {
    /// Typed parameters handed to the execution step.
    type Params: fmt::Debug + Send + 'static;

    /// Stored query name, e.g. `GetFolderAndContents`.
    fn name(&self) -> &'static str;

    /// Registry query id (`urn:uuid:...`).
    fn query_id(&self) -> &'static str;

    /// Rules the request must satisfy.
    fn constraints(&self) -> &ConstraintTable;

    /// Converts a validated bag into typed parameters.
    ///
    /// Called only after validation found no violation. Performs type
    /// conversion and defaulting, never business-rule validation.
    fn parse(&self, bag: &ParameterBag) -> Result<Self::Params, InternalError>;
}

/// Phases of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Identity guard over required alternative groups.
    Guard,
    /// Constraint table validation.
    Validating,
    /// Conversion into typed parameters.
    Parsing,
    /// Execution step call.
    Executing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Guard => write!(f, "guard"),
            Phase::Validating => write!(f, "validating"),
            Phase::Parsing => write!(f, "parsing"),
            Phase::Executing => write!(f, "executing"),
        }
    }
}

/// Checks that every required alternative group has at least one value.
///
/// A request that leaves a whole group empty can never identify its target
/// entity, so this is reported as an internal failure before validation.
pub fn check_identity(table: &ConstraintTable, bag: &ParameterBag) -> Result<(), InternalError> {
    for group in table.alternative_groups() {
        if !group.iter().any(|name| bag.has_value(name)) {
            return Err(InternalError::UnresolvableIdentity {
                query: table.query().to_string(),
                parameters: group.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// A query variant bound to the execution step that runs it.
pub struct StoredQueryPipeline<V, E> {
    variant: V,
    step: Arc<E>,
}

impl<V, E> StoredQueryPipeline<V, E>
where
    V: QueryVariant,
    E: ExecutionStep<V::Params>,
{
    /// Binds `variant` to `step`.
    pub fn new(variant: V, step: Arc<E>) -> Self {
        Self { variant, step }
    }

    /// Returns the query variant.
    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Runs the stored query for one request.
    ///
    /// Violations found during validation are recorded on `bag` and returned
    /// as [`StoredQueryError::Validation`]. The execution step is not called
    /// unless the guard, validation and parsing all succeed. Backend errors
    /// are returned unchanged.
    pub async fn run(&self, bag: &mut ParameterBag) -> StoredQueryResult<QueryResult> {
        let query = self.variant.name();
        let table = self.variant.constraints();

        debug!(query, phase = %Phase::Guard, "Checking target identity");
        check_identity(table, bag).inspect_err(|e| {
            error!(query, phase = %Phase::Guard, error = %e, "Stored query aborted");
        })?;

        debug!(query, phase = %Phase::Validating, parameters = bag.len(), "Validating parameters");
        let violations = validator::validate(table, bag);
        if !violations.is_empty() {
            warn!(
                query,
                phase = %Phase::Validating,
                violations = violations.len(),
                "Stored query parameters invalid"
            );
            return Err(StoredQueryError::Validation(violations));
        }

        debug!(query, phase = %Phase::Parsing, "Parsing parameters");
        let params = self.variant.parse(bag).inspect_err(|e| {
            error!(query, phase = %Phase::Parsing, error = %e, "Stored query aborted");
        })?;

        debug!(query, phase = %Phase::Executing, params = ?params, "Executing stored query");
        let result = self.step.execute(params).await?;
        debug!(query, objects = result.len(), "Stored query complete");
        Ok(result)
    }
}

/// Object-safe handle on a runnable stored query.
///
/// Lets the registry hold variants with different parameter records side by
/// side.
#[async_trait]
pub trait StoredQueryHandler: Send + Sync {
    /// Stored query name.
    fn name(&self) -> &str;

    /// Registry query id.
    fn query_id(&self) -> &str;

    /// Rules the request must satisfy.
    fn constraints(&self) -> &ConstraintTable;

    /// Runs the stored query for one request.
    async fn run(&self, bag: &mut ParameterBag) -> StoredQueryResult<QueryResult>;
}

#[async_trait]
impl<V, E> StoredQueryHandler for StoredQueryPipeline<V, E>
where
    V: QueryVariant,
    E: ExecutionStep<V::Params> + 'static,
{
    fn name(&self) -> &str {
        self.variant.name()
    }

    fn query_id(&self) -> &str {
        self.variant.query_id()
    }

    fn constraints(&self) -> &ConstraintTable {
        self.variant.constraints()
    }

    async fn run(&self, bag: &mut ParameterBag) -> StoredQueryResult<QueryResult> {
        StoredQueryPipeline::run(self, bag).await
    }
}
