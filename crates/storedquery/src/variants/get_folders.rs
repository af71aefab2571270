//! GetFolders: folders by entry UUID or unique id.

use crate::constraints::{ConstraintTable, ParameterRule};
use crate::error::{ConfigurationError, InternalError};
use crate::metadata::{param, query_id};
use crate::params::ParameterBag;
use crate::pipeline::QueryVariant;

use super::{ObjectRef, object_refs};

/// Typed parameters of GetFolders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldersParams {
    /// Folders to return.
    pub folders: Vec<ObjectRef>,
}

/// The GetFolders stored query.
#[derive(Debug, Clone)]
pub struct GetFolders {
    table: ConstraintTable,
}

impl GetFolders {
    /// Stored query name.
    pub const NAME: &'static str = "GetFolders";

    /// Builds the variant and its constraint table.
    pub fn new() -> Result<Self, ConfigurationError> {
        let table = ConstraintTable::new(
            Self::NAME,
            vec![
                ParameterRule::required(param::FOLDER_ENTRY_UUID)
                    .multiple()
                    .or_alternative(param::FOLDER_UNIQUE_ID),
                ParameterRule::required(param::FOLDER_UNIQUE_ID)
                    .multiple()
                    .or_alternative(param::FOLDER_ENTRY_UUID),
            ],
        )?;
        Ok(Self { table })
    }
}

impl QueryVariant for GetFolders {
    type Params = FoldersParams;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn query_id(&self) -> &'static str {
        query_id::GET_FOLDERS
    }

    fn constraints(&self) -> &ConstraintTable {
        &self.table
    }

    fn parse(&self, bag: &ParameterBag) -> Result<FoldersParams, InternalError> {
        Ok(FoldersParams {
            folders: object_refs(
                Self::NAME,
                bag,
                param::FOLDER_ENTRY_UUID,
                param::FOLDER_UNIQUE_ID,
            )?,
        })
    }
}
