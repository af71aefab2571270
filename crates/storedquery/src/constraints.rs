//! Declarative per-query parameter rules.
//!
//! A [`ConstraintTable`] lists, in order, one [`ParameterRule`] for every
//! parameter a stored query recognizes. Tables are built once per query
//! variant and shared read-only between requests.
//!
//! # Example
//!
//! ```
//! use helios_storedquery::constraints::{ConstraintTable, ParameterRule};
//!
//! let table = ConstraintTable::new(
//!     "GetFolderAndContents",
//!     vec![
//!         ParameterRule::required("$XDSFolderEntryUUID").or_alternative("$XDSFolderUniqueId"),
//!         ParameterRule::required("$XDSFolderUniqueId").or_alternative("$XDSFolderEntryUUID"),
//!         ParameterRule::optional("$XDSDocumentEntryConfidentialityCode")
//!             .multiple()
//!             .coded()
//!             .and_or(),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(table.alternative_groups().len(), 1);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Validation rule for one named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRule {
    /// Parameter name, including its `$` sigil.
    pub name: String,
    /// The parameter (or its alternative) must carry a value.
    pub required: bool,
    /// More than one value may be supplied.
    pub multiple: bool,
    /// Values are free strings. When false, values must be DTM timestamps.
    pub string_valued: bool,
    /// Values must have the coded-value shape.
    pub coded: bool,
    /// Multiple values may be combined with OR.
    pub and_or_allowed: bool,
    /// Parameter that satisfies the requirement in place of this one.
    pub alternative: Option<String>,
}

impl ParameterRule {
    fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            multiple: false,
            string_valued: true,
            coded: false,
            and_or_allowed: false,
            alternative: None,
        }
    }

    /// A required, single-valued string parameter.
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// An optional, single-valued string parameter.
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Allows more than one value.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Declares the values as DTM timestamps rather than free strings.
    pub fn timestamp(mut self) -> Self {
        self.string_valued = false;
        self
    }

    /// Requires coded values.
    pub fn coded(mut self) -> Self {
        self.coded = true;
        self
    }

    /// Allows OR combination of multiple values.
    pub fn and_or(mut self) -> Self {
        self.and_or_allowed = true;
        self
    }

    /// Names the parameter that may be supplied instead of this one.
    pub fn or_alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternative = Some(alternative.into());
        self
    }
}

/// Ordered set of rules for one stored query.
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintTable {
    query: String,
    rules: Vec<ParameterRule>,
    exclusive_alternatives: bool,
}

impl ConstraintTable {
    /// Builds a table, rejecting duplicate names and inconsistent alternatives.
    pub fn new(
        query: impl Into<String>,
        rules: Vec<ParameterRule>,
    ) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigurationError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }

        for rule in &rules {
            let Some(alternative) = &rule.alternative else {
                continue;
            };
            if *alternative == rule.name {
                return Err(ConfigurationError::SelfAlternative {
                    name: rule.name.clone(),
                });
            }
            // An alternative without a rule of its own is only a presence check.
            let Some(other) = rules.iter().find(|r| r.name == *alternative) else {
                continue;
            };
            if other.alternative.as_deref() != Some(rule.name.as_str()) {
                return Err(ConfigurationError::InconsistentAlternative {
                    name: rule.name.clone(),
                    alternative: alternative.clone(),
                    found: other.alternative.clone(),
                });
            }
            if other.required != rule.required {
                return Err(ConfigurationError::AlternativeRequiredMismatch {
                    name: rule.name.clone(),
                    alternative: alternative.clone(),
                });
            }
        }

        Ok(Self {
            query: query.into(),
            rules,
            exclusive_alternatives: false,
        })
    }

    /// Rejects requests that supply both a parameter and its alternative.
    pub fn with_exclusive_alternatives(mut self) -> Self {
        self.exclusive_alternatives = true;
        self
    }

    /// Returns the stored query name this table belongs to.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[ParameterRule] {
        &self.rules
    }

    /// Returns the rule for `name`.
    pub fn get(&self, name: &str) -> Option<&ParameterRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Returns true if both members of an alternative pair may not be supplied together.
    pub fn exclusive_alternatives(&self) -> bool {
        self.exclusive_alternatives
    }

    /// Returns every required parameter/alternative pair, once per pair.
    ///
    /// At least one member of each group must carry a value for the request
    /// to identify its target.
    pub fn alternative_groups(&self) -> Vec<[&str; 2]> {
        let mut groups: Vec<[&str; 2]> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.required) {
            let Some(alternative) = rule.alternative.as_deref() else {
                continue;
            };
            let pair = [rule.name.as_str(), alternative];
            let known = groups
                .iter()
                .any(|g| (g[0] == pair[0] && g[1] == pair[1]) || (g[0] == pair[1] && g[1] == pair[0]));
            if !known {
                groups.push(pair);
            }
        }
        groups
    }
}
