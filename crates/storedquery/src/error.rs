//! Error types for the stored query pipeline.
//!
//! The hierarchy mirrors the three failure classes a stored query can end in:
//!
//! - [`ValidationErrors`] - the caller supplied parameters that violate the
//!   query's constraint table. Always reported as the full aggregate.
//! - [`InternalError`] - a defect in a constraint table, the engine, or a value
//!   that passed validation but could not be converted.
//! - [`BackendError`] - an opaque failure from an execution step, propagated
//!   unchanged.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The primary error type returned by a stored query run.
#[derive(Error, Debug)]
pub enum StoredQueryError {
    /// The parameter set failed validation.
    #[error("stored query parameters invalid: {0}")]
    Validation(ValidationErrors),

    /// Engine, configuration or conversion defect.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Execution step failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Query lookup failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<ValidationErrors> for StoredQueryError {
    fn from(errors: ValidationErrors) -> Self {
        StoredQueryError::Validation(errors)
    }
}

impl StoredQueryError {
    /// Returns the registry error code a transport layer should report.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoredQueryError::Validation(errors) => {
                if errors
                    .iter()
                    .any(|v| v.rule == ViolatedRule::Cardinality)
                {
                    "XDSStoredQueryParamNumber"
                } else {
                    "XDSRegistryError"
                }
            }
            StoredQueryError::Internal(_) => "XDSRegistryError",
            StoredQueryError::Backend(BackendError::Unavailable { .. }) => {
                "XDSRegistryNotAvailable"
            }
            StoredQueryError::Backend(_) => "XDSRegistryError",
            StoredQueryError::Registry(_) => "XDSUnknownStoredQuery",
        }
    }

    /// Returns true when the failure is attributable to the caller's request.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            StoredQueryError::Validation(_) | StoredQueryError::Registry(_)
        )
    }

    /// Returns the validation violations, if this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            StoredQueryError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// The rule a parameter violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolatedRule {
    /// A required parameter (or its alternative) is absent.
    MissingRequired,
    /// A single-valued parameter carries more than one value.
    Cardinality,
    /// A required multi-valued parameter is present with no values.
    EmptyValueList,
    /// A value does not parse as the declared non-string type.
    ValueType,
    /// A value does not have the coded-value shape.
    CodedValue,
    /// OR combination requested on a parameter that only allows AND.
    Combinator,
    /// A parameter and its alternative were both supplied to an exclusive table.
    ConflictingAlternatives,
}

impl fmt::Display for ViolatedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolatedRule::MissingRequired => "missing-required",
            ViolatedRule::Cardinality => "cardinality",
            ViolatedRule::EmptyValueList => "empty-value-list",
            ViolatedRule::ValueType => "value-type",
            ViolatedRule::CodedValue => "coded-value",
            ViolatedRule::Combinator => "combinator",
            ViolatedRule::ConflictingAlternatives => "conflicting-alternatives",
        };
        write!(f, "{}", name)
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterViolation {
    /// The parameter the violation is reported against.
    pub parameter: String,
    /// The rule that was violated.
    pub rule: ViolatedRule,
    /// Human-readable detail.
    pub detail: String,
}

impl ParameterViolation {
    /// Creates a new violation.
    pub fn new(parameter: impl Into<String>, rule: ViolatedRule, detail: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            rule,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ParameterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.parameter, self.rule, self.detail)
    }
}

/// Ordered aggregate of every violation found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<ParameterViolation>,
}

impl ValidationErrors {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn push(&mut self, violation: ParameterViolation) {
        self.violations.push(violation);
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Iterates over the violations in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterViolation> {
        self.violations.iter()
    }

    /// Returns the violations recorded against `parameter`.
    pub fn for_parameter<'a>(
        &'a self,
        parameter: &'a str,
    ) -> impl Iterator<Item = &'a ParameterViolation> + 'a {
        self.violations.iter().filter(move |v| v.parameter == parameter)
    }

    /// Returns true if any violation of `rule` was recorded.
    pub fn contains_rule(&self, rule: ViolatedRule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
            first = false;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ParameterViolation;
    type IntoIter = std::slice::Iter<'a, ParameterViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl Extend<ParameterViolation> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ParameterViolation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

/// Failures that are not attributable to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// No parameter of a required alternative group carries a value, so the
    /// request can never identify its target entity.
    #[error("{query}: none of {parameters:?} is present, target cannot be identified")]
    UnresolvableIdentity {
        query: String,
        parameters: Vec<String>,
    },

    /// A validated value could not be converted to its typed field.
    #[error("{query}: cannot convert '{value}' of parameter {parameter} to {expected}")]
    Conversion {
        query: String,
        parameter: String,
        value: String,
        expected: String,
    },

    /// A constraint table defect detected at construction.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Defects in a constraint table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two rules share a name.
    #[error("duplicate rule for parameter {name}")]
    DuplicateRule { name: String },

    /// A rule names itself as its alternative.
    #[error("parameter {name} lists itself as its alternative")]
    SelfAlternative { name: String },

    /// An alternative pair is not mutually declared.
    #[error("parameter {name} lists {alternative} as alternative, but {alternative} lists {found:?}")]
    InconsistentAlternative {
        name: String,
        alternative: String,
        found: Option<String>,
    },

    /// An alternative pair disagrees on whether the pair is required.
    #[error("alternatives {name} and {alternative} disagree on required-ness")]
    AlternativeRequiredMismatch { name: String, alternative: String },

    /// Two bundled stored queries share a name or query id.
    #[error("stored query {key} is declared twice")]
    DuplicateQuery { key: String },
}

/// Errors originating from an execution step.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The metadata store is unreachable.
    #[error("metadata store unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The requested entity does not exist.
    #[error("{object_type} not found: {identifier}")]
    NotFound {
        object_type: String,
        identifier: String,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Fixture or result serialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Errors related to the stored query registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No stored query is registered under this name or id.
    #[error("unknown stored query: {key}")]
    UnknownQuery { key: String },

    /// A stored query with this name or id already exists.
    #[error("stored query already registered: {key}")]
    Duplicate { key: String },
}

/// Result type alias for stored query runs.
pub type StoredQueryResult<T> = Result<T, StoredQueryError>;

/// Result type alias for execution steps.
pub type BackendResult<T> = Result<T, BackendError>;

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Internal {
            backend_name: "unknown".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
