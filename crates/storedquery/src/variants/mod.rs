//! Stored query variants.
//!
//! Each variant defines a constraint table, a typed parameter record and the
//! parser that fills it. Execution steps live with the stores that implement
//! them (see [`crate::backends`]).
//!
//! | Variant | Query id |
//! |---------|----------|
//! | [`GetFolderAndContents`] | `urn:uuid:b909a503-523d-4517-8acf-8e5834dfc4c7` |
//! | [`GetFolders`] | `urn:uuid:5737b14c-8a1a-4539-b659-e03a34a5e1e4` |
//! | [`GetDocuments`] | `urn:uuid:5c4f972b-d56b-40ac-a5fc-c8ca9b40b9d4` |

mod folder_and_contents;
mod get_documents;
mod get_folders;

pub use folder_and_contents::{FolderAndContentsParams, GetFolderAndContents};
pub use get_documents::{DocumentsParams, GetDocuments};
pub use get_folders::{FoldersParams, GetFolders};

use serde::{Deserialize, Serialize};

use crate::codes::{CodeFilter, CodedValue};
use crate::error::InternalError;
use crate::params::ParameterBag;

/// Identifies a registry object either by entry UUID or by unique id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectRef {
    /// Registry-assigned entry UUID.
    EntryUuid(String),
    /// Submitter-assigned unique id.
    UniqueId(String),
}

impl ObjectRef {
    /// Returns the identifier value.
    pub fn value(&self) -> &str {
        match self {
            ObjectRef::EntryUuid(v) | ObjectRef::UniqueId(v) => v,
        }
    }
}

/// Reads object references from a UUID parameter and its unique-id alternative.
///
/// When both are supplied the entry UUIDs win; the unique ids are ignored.
pub(crate) fn object_refs(
    query: &str,
    bag: &ParameterBag,
    uuid_param: &str,
    uid_param: &str,
) -> Result<Vec<ObjectRef>, InternalError> {
    if let Some(values) = bag.values(uuid_param).filter(|v| !v.is_empty()) {
        return Ok(values.iter().cloned().map(ObjectRef::EntryUuid).collect());
    }
    if let Some(values) = bag.values(uid_param).filter(|v| !v.is_empty()) {
        return Ok(values.iter().cloned().map(ObjectRef::UniqueId).collect());
    }
    Err(InternalError::UnresolvableIdentity {
        query: query.to_string(),
        parameters: vec![uuid_param.to_string(), uid_param.to_string()],
    })
}

/// Parses the coded values of `name`, or `None` when the parameter is absent.
pub(crate) fn coded_values(
    query: &str,
    bag: &ParameterBag,
    name: &str,
) -> Result<Option<Vec<CodedValue>>, InternalError> {
    let Some(values) = bag.values(name) else {
        return Ok(None);
    };
    values
        .iter()
        .map(|value| {
            value
                .parse::<CodedValue>()
                .map_err(|_| InternalError::Conversion {
                    query: query.to_string(),
                    parameter: name.to_string(),
                    value: value.clone(),
                    expected: "coded value".to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Parses the coded values of `name` together with their combinator.
pub(crate) fn code_filter(
    query: &str,
    bag: &ParameterBag,
    name: &str,
) -> Result<Option<CodeFilter>, InternalError> {
    let combinator = bag.combinator(name).unwrap_or_default();
    Ok(coded_values(query, bag, name)?.map(|codes| CodeFilter { codes, combinator }))
}
