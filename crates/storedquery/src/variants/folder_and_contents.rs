//! GetFolderAndContents: a folder and the document entries it holds.

use crate::codes::{CodeFilter, CodedValue};
use crate::constraints::{ConstraintTable, ParameterRule};
use crate::error::{ConfigurationError, InternalError};
use crate::metadata::{self, param, query_id};
use crate::params::ParameterBag;
use crate::pipeline::QueryVariant;

use super::{ObjectRef, code_filter, coded_values, object_refs};

/// Typed parameters of GetFolderAndContents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderAndContentsParams {
    /// The folder, by entry UUID or unique id.
    pub folder: ObjectRef,
    /// Format codes; a document must carry one of them.
    pub format_codes: Option<Vec<CodedValue>>,
    /// Confidentiality codes and how to combine them.
    pub confidentiality_codes: Option<CodeFilter>,
    /// Document entry object types to return.
    pub object_types: Vec<String>,
}

/// The GetFolderAndContents stored query.
#[derive(Debug, Clone)]
pub struct GetFolderAndContents {
    table: ConstraintTable,
}

impl GetFolderAndContents {
    /// Stored query name.
    pub const NAME: &'static str = "GetFolderAndContents";

    /// Builds the variant and its constraint table.
    pub fn new() -> Result<Self, ConfigurationError> {
        let table = ConstraintTable::new(
            Self::NAME,
            vec![
                ParameterRule::required(param::FOLDER_ENTRY_UUID)
                    .or_alternative(param::FOLDER_UNIQUE_ID),
                ParameterRule::required(param::FOLDER_UNIQUE_ID)
                    .or_alternative(param::FOLDER_ENTRY_UUID),
                ParameterRule::optional(param::DOCUMENT_ENTRY_FORMAT_CODE)
                    .multiple()
                    .coded(),
                ParameterRule::optional(param::DOCUMENT_ENTRY_CONFIDENTIALITY_CODE)
                    .multiple()
                    .coded()
                    .and_or(),
                ParameterRule::optional(param::DOCUMENT_ENTRY_TYPE).multiple(),
            ],
        )?;
        Ok(Self { table })
    }
}

impl QueryVariant for GetFolderAndContents {
    type Params = FolderAndContentsParams;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn query_id(&self) -> &'static str {
        query_id::GET_FOLDER_AND_CONTENTS
    }

    fn constraints(&self) -> &ConstraintTable {
        &self.table
    }

    fn parse(&self, bag: &ParameterBag) -> Result<FolderAndContentsParams, InternalError> {
        let folder = object_refs(
            Self::NAME,
            bag,
            param::FOLDER_ENTRY_UUID,
            param::FOLDER_UNIQUE_ID,
        )?
        .into_iter()
        .next()
        .ok_or_else(|| InternalError::UnresolvableIdentity {
            query: Self::NAME.to_string(),
            parameters: vec![
                param::FOLDER_ENTRY_UUID.to_string(),
                param::FOLDER_UNIQUE_ID.to_string(),
            ],
        })?;

        // An absent type filter means stable documents only, never "any type".
        let object_types = match bag.values(param::DOCUMENT_ENTRY_TYPE) {
            Some(values) => values.to_vec(),
            None => metadata::DEFAULT_DOCUMENT_ENTRY_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Ok(FolderAndContentsParams {
            folder,
            format_codes: coded_values(Self::NAME, bag, param::DOCUMENT_ENTRY_FORMAT_CODE)?,
            confidentiality_codes: code_filter(
                Self::NAME,
                bag,
                param::DOCUMENT_ENTRY_CONFIDENTIALITY_CODE,
            )?,
            object_types,
        })
    }
}
