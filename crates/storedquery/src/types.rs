//! Registry objects returned by stored queries.
//!
//! The pipeline treats a [`QueryResult`] as opaque and passes it through.
//! The object model is limited to what the bundled execution steps need.

use serde::{Deserialize, Serialize};

use crate::codes::CodedValue;
use crate::metadata;

fn approved() -> String {
    metadata::STATUS_APPROVED.to_string()
}

fn stable() -> String {
    metadata::DOCUMENT_ENTRY_STABLE.to_string()
}

/// A folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Registry-assigned entry UUID (`urn:uuid:...`).
    pub entry_uuid: String,
    /// Globally unique OID.
    pub unique_id: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Availability status.
    #[serde(default = "approved")]
    pub status: String,
}

/// A document entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// Registry-assigned entry UUID (`urn:uuid:...`).
    pub entry_uuid: String,
    /// Globally unique OID.
    pub unique_id: String,
    /// Stable or on-demand object type.
    #[serde(default = "stable")]
    pub object_type: String,
    /// Format code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_code: Option<CodedValue>,
    /// Confidentiality codes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confidentiality_codes: Vec<CodedValue>,
    /// Home community, for cross-community responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_community_id: Option<String>,
    /// Availability status.
    #[serde(default = "approved")]
    pub status: String,
}

/// An association between two registry objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    /// Registry-assigned entry UUID.
    pub entry_uuid: String,
    /// Association type URN.
    pub association_type: String,
    /// Entry UUID of the source object.
    pub source: String,
    /// Entry UUID of the target object.
    pub target: String,
}

impl Association {
    /// Returns true for HasMember associations.
    pub fn is_has_member(&self) -> bool {
        self.association_type == metadata::ASSOCIATION_HAS_MEMBER
    }
}

/// Any object a stored query can return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "objectType", rename_all = "camelCase")]
pub enum RegistryObject {
    /// A folder.
    Folder(Folder),
    /// A document entry.
    DocumentEntry(DocumentEntry),
    /// An association.
    Association(Association),
}

/// Result set of one stored query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Returned objects, in the order the execution step produced them.
    pub objects: Vec<RegistryObject>,
}

impl QueryResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object.
    pub fn push(&mut self, object: RegistryObject) {
        self.objects.push(object);
    }

    /// Returns the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no object was returned.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over returned folders.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.objects.iter().filter_map(|o| match o {
            RegistryObject::Folder(f) => Some(f),
            _ => None,
        })
    }

    /// Iterates over returned document entries.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.objects.iter().filter_map(|o| match o {
            RegistryObject::DocumentEntry(d) => Some(d),
            _ => None,
        })
    }

    /// Iterates over returned associations.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.objects.iter().filter_map(|o| match o {
            RegistryObject::Association(a) => Some(a),
            _ => None,
        })
    }
}
