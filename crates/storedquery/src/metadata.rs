//! Well-known registry identifiers.
//!
//! Object types, association types and stored query ids are fixed by the
//! XDS.b profile. They are collected here so that parsers and stores share a
//! single definition instead of embedding literals.

/// Object type of a stable document entry.
pub const DOCUMENT_ENTRY_STABLE: &str = "urn:uuid:7edca82f-054d-47f2-a032-9b2a5b5186c1";

/// Object type of an on-demand document entry.
pub const DOCUMENT_ENTRY_ON_DEMAND: &str = "urn:uuid:34268e47-fdf5-41a6-ba33-82133c465248";

/// Object type applied to document entries when a query gives no filter.
pub const DEFAULT_DOCUMENT_ENTRY_TYPES: &[&str] = &[DOCUMENT_ENTRY_STABLE];

/// Classification scheme of a folder (registry package classified as folder).
pub const FOLDER_CLASSIFICATION: &str = "urn:uuid:d9d542f3-6cc4-48b6-8870-ea235fbc94c2";

/// Association type linking a folder or submission set to its members.
pub const ASSOCIATION_HAS_MEMBER: &str =
    "urn:oasis:names:tc:ebxml-regrep:AssociationType:HasMember";

/// Approved availability status.
pub const STATUS_APPROVED: &str = "urn:oasis:names:tc:ebxml-regrep:StatusType:Approved";

/// Deprecated availability status.
pub const STATUS_DEPRECATED: &str = "urn:oasis:names:tc:ebxml-regrep:StatusType:Deprecated";

/// Stored query ids.
pub mod query_id {
    /// GetFolderAndContents.
    pub const GET_FOLDER_AND_CONTENTS: &str = "urn:uuid:b909a503-523d-4517-8acf-8e5834dfc4c7";
    /// GetFolders.
    pub const GET_FOLDERS: &str = "urn:uuid:5737b14c-8a1a-4539-b659-e03a34a5e1e4";
    /// GetDocuments.
    pub const GET_DOCUMENTS: &str = "urn:uuid:5c4f972b-d56b-40ac-a5fc-c8ca9b40b9d4";
}

/// Stored query parameter names.
#[allow(missing_docs)]
pub mod param {
    pub const FOLDER_ENTRY_UUID: &str = "$XDSFolderEntryUUID";
    pub const FOLDER_UNIQUE_ID: &str = "$XDSFolderUniqueId";
    pub const DOCUMENT_ENTRY_ENTRY_UUID: &str = "$XDSDocumentEntryEntryUUID";
    pub const DOCUMENT_ENTRY_UNIQUE_ID: &str = "$XDSDocumentEntryUniqueId";
    pub const DOCUMENT_ENTRY_FORMAT_CODE: &str = "$XDSDocumentEntryFormatCode";
    pub const DOCUMENT_ENTRY_CONFIDENTIALITY_CODE: &str = "$XDSDocumentEntryConfidentialityCode";
    pub const DOCUMENT_ENTRY_TYPE: &str = "$XDSDocumentEntryType";
    pub const HOME_COMMUNITY_ID: &str = "$homeCommunityId";
}
