//! Value shapes checked by the validator and produced by parsers.
//!
//! Coded values use the stored query encoding `code^^^scheme`. The scheme
//! qualifier may be omitted, in which case the code matches in any scheme.
//! Non-string parameters carry HL7 DTM timestamps.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::params::Combinator;

static CODED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<code>[^\^]+)(?:\^\^\^(?P<scheme>[^\^]+))?$").expect("valid coded value regex")
});

static DTM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(?:\d{2}){0,5}$").expect("valid DTM regex"));

/// A code drawn from a controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodedValue {
    /// The code.
    pub code: String,
    /// The coding scheme, when qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl CodedValue {
    /// Creates a scheme-qualified code.
    pub fn new(code: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            scheme: Some(scheme.into()),
        }
    }

    /// Creates a code without scheme.
    pub fn unqualified(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            scheme: None,
        }
    }

    /// Returns true if `other` denotes the same concept.
    ///
    /// Codes must be equal; schemes must be equal unless either side is
    /// unqualified.
    pub fn matches(&self, other: &CodedValue) -> bool {
        if self.code != other.code {
            return false;
        }
        match (&self.scheme, &other.scheme) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl FromStr for CodedValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = CODED_VALUE
            .captures(s.trim())
            .ok_or_else(|| format!("'{}' is not of the form code^^^scheme", s))?;
        Ok(CodedValue {
            code: caps["code"].to_string(),
            scheme: caps.name("scheme").map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for CodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scheme {
            Some(scheme) => write!(f, "{}^^^{}", self.code, scheme),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Returns true if `value` has the coded-value shape.
pub fn is_coded_value(value: &str) -> bool {
    CODED_VALUE.is_match(value.trim())
}

/// Returns true if `value` is an HL7 DTM timestamp (YYYY[MM[DD[HH[MM[SS]]]]]).
pub fn is_dtm(value: &str) -> bool {
    DTM.is_match(value)
}

/// A set of codes and the combinator applied across them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFilter {
    /// The codes to match.
    pub codes: Vec<CodedValue>,
    /// AND requires every code, OR requires any.
    pub combinator: Combinator,
}

impl CodeFilter {
    /// Returns true if `candidates` satisfy the filter.
    pub fn accepts(&self, candidates: &[CodedValue]) -> bool {
        let hit = |wanted: &CodedValue| candidates.iter().any(|c| wanted.matches(c));
        match self.combinator {
            Combinator::And => self.codes.iter().all(hit),
            Combinator::Or => self.codes.iter().any(hit),
        }
    }
}
