//! GetDocuments: document entries by entry UUID or unique id.

use crate::constraints::{ConstraintTable, ParameterRule};
use crate::error::{ConfigurationError, InternalError};
use crate::metadata::{param, query_id};
use crate::params::ParameterBag;
use crate::pipeline::QueryVariant;

use super::{ObjectRef, object_refs};

/// Typed parameters of GetDocuments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentsParams {
    /// Document entries to return.
    pub documents: Vec<ObjectRef>,
    /// Restricts results to one community.
    pub home_community_id: Option<String>,
}

/// The GetDocuments stored query.
#[derive(Debug, Clone)]
pub struct GetDocuments {
    table: ConstraintTable,
}

impl GetDocuments {
    /// Stored query name.
    pub const NAME: &'static str = "GetDocuments";

    /// Builds the variant and its constraint table.
    pub fn new() -> Result<Self, ConfigurationError> {
        let table = ConstraintTable::new(
            Self::NAME,
            vec![
                ParameterRule::required(param::DOCUMENT_ENTRY_ENTRY_UUID)
                    .multiple()
                    .or_alternative(param::DOCUMENT_ENTRY_UNIQUE_ID),
                ParameterRule::required(param::DOCUMENT_ENTRY_UNIQUE_ID)
                    .multiple()
                    .or_alternative(param::DOCUMENT_ENTRY_ENTRY_UUID),
                ParameterRule::optional(param::HOME_COMMUNITY_ID),
            ],
        )?;
        Ok(Self { table })
    }
}

impl QueryVariant for GetDocuments {
    type Params = DocumentsParams;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn query_id(&self) -> &'static str {
        query_id::GET_DOCUMENTS
    }

    fn constraints(&self) -> &ConstraintTable {
        &self.table
    }

    fn parse(&self, bag: &ParameterBag) -> Result<DocumentsParams, InternalError> {
        Ok(DocumentsParams {
            documents: object_refs(
                Self::NAME,
                bag,
                param::DOCUMENT_ENTRY_ENTRY_UUID,
                param::DOCUMENT_ENTRY_UNIQUE_ID,
            )?,
            home_community_id: bag.single(param::HOME_COMMUNITY_ID).map(str::to_string),
        })
    }
}
