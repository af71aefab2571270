//! The decoded stored query parameter set.
//!
//! A [`ParameterBag`] is produced by the transport layer for one request and
//! handed to the pipeline. The pipeline never changes its values; it only
//! annotates it with the violations found during validation.
//!
//! # JSON form
//!
//! Each entry is either a list of strings (values combined with AND) or an
//! object naming the combinator explicitly:
//!
//! ```
//! use helios_storedquery::params::{Combinator, ParameterBag};
//!
//! let bag: ParameterBag = serde_json::from_str(r#"{
//!     "$XDSFolderEntryUUID": ["urn:uuid:123"],
//!     "$XDSDocumentEntryConfidentialityCode": { "values": ["R", "N"], "combinator": "or" }
//! }"#).unwrap();
//!
//! assert_eq!(bag.single("$XDSFolderEntryUUID"), Some("urn:uuid:123"));
//! assert_eq!(
//!     bag.combinator("$XDSDocumentEntryConfidentialityCode"),
//!     Some(Combinator::Or)
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParameterViolation, ValidationErrors};

/// Logical operator applied across the values of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Results must match every value.
    #[default]
    And,
    /// Results may match any one value.
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}

/// The raw values supplied for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawValues")]
pub struct ParameterValues {
    values: Vec<String>,
    combinator: Combinator,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValues {
    Single(String),
    List(Vec<String>),
    Combined {
        values: Vec<String>,
        #[serde(default)]
        combinator: Combinator,
    },
}

impl From<RawValues> for ParameterValues {
    fn from(raw: RawValues) -> Self {
        match raw {
            RawValues::Single(value) => ParameterValues::new(vec![value]),
            RawValues::List(values) => ParameterValues::new(values),
            RawValues::Combined { values, combinator } => {
                ParameterValues::new(values).with_combinator(combinator)
            }
        }
    }
}

impl ParameterValues {
    /// Creates AND-combined values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            combinator: Combinator::And,
        }
    }

    /// Sets the combinator.
    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    /// Returns the values in supplied order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the requested combinator.
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the parameter was supplied without values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named, multi-valued parameters of one stored query request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "HashMap<String, ParameterValues>")]
#[serde(into = "HashMap<String, ParameterValues>")]
pub struct ParameterBag {
    params: HashMap<String, ParameterValues>,
    errors: ValidationErrors,
}

impl From<HashMap<String, ParameterValues>> for ParameterBag {
    fn from(params: HashMap<String, ParameterValues>) -> Self {
        Self {
            params,
            errors: ValidationErrors::new(),
        }
    }
}

impl From<ParameterBag> for HashMap<String, ParameterValues> {
    fn from(bag: ParameterBag) -> Self {
        bag.params
    }
}

impl ParameterBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds AND-combined values for `name`, replacing any earlier entry.
    pub fn with<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, ParameterValues::new(values));
        self
    }

    /// Adds OR-combined values for `name`, replacing any earlier entry.
    pub fn with_or<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(
            name,
            ParameterValues::new(values).with_combinator(Combinator::Or),
        );
        self
    }

    /// Inserts the values for `name`.
    pub fn insert(&mut self, name: impl Into<String>, values: ParameterValues) {
        self.params.insert(name.into(), values);
    }

    /// Returns the entry for `name`, if the parameter was supplied at all.
    pub fn get(&self, name: &str) -> Option<&ParameterValues> {
        self.params.get(name)
    }

    /// Returns the values for `name`.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(ParameterValues::values)
    }

    /// Returns the first value for `name`.
    pub fn single(&self, name: &str) -> Option<&str> {
        self.values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the combinator requested for `name`.
    pub fn combinator(&self, name: &str) -> Option<Combinator> {
        self.params.get(name).map(ParameterValues::combinator)
    }

    /// Returns true if `name` was supplied, even with no values.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns true if `name` carries at least one value.
    pub fn has_value(&self, name: &str) -> bool {
        self.params.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Iterates over the supplied parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Returns the number of supplied parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameter was supplied.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Records a violation against this request.
    pub fn record(&mut self, violation: ParameterViolation) {
        self.errors.push(violation);
    }

    /// Returns the violations recorded so far.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Returns true once any violation has been recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
