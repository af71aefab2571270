//! Shared fixtures for the stored query integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use helios_storedquery::backends::InMemoryMetadataStore;
use helios_storedquery::error::{BackendError, BackendResult};
use helios_storedquery::types::QueryResult;
use helios_storedquery::variants::{FolderAndContentsParams, GetFolderAndContents};
use helios_storedquery::{ExecutionStep, StoredQueryPipeline};

/// Folder entry UUID present in [`REGISTRY_FIXTURE`].
pub const FOLDER_UUID: &str = "urn:uuid:0f2b8a1e-5c3d-4e6f-8a9b-1c2d3e4f5a6b";

/// Folder unique id present in [`REGISTRY_FIXTURE`].
pub const FOLDER_UNIQUE_ID: &str = "1.3.6.1.4.1.21367.2005.3.7.1001";

/// A folder holding one stable and one on-demand document entry.
pub const REGISTRY_FIXTURE: &str = r#"{
    "folders": [
        {
            "entryUuid": "urn:uuid:0f2b8a1e-5c3d-4e6f-8a9b-1c2d3e4f5a6b",
            "uniqueId": "1.3.6.1.4.1.21367.2005.3.7.1001",
            "title": "Cardiology referral"
        }
    ],
    "documents": [
        {
            "entryUuid": "urn:uuid:d0000000-0000-4000-8000-000000000001",
            "uniqueId": "1.3.6.1.4.1.21367.2005.3.7.2001",
            "formatCode": { "code": "urn:ihe:pcc:xphr:2007", "scheme": "1.3.6.1.4.1.19376.1.2.3" },
            "confidentialityCodes": [{ "code": "N", "scheme": "2.16.840.1.113883.5.25" }],
            "homeCommunityId": "urn:oid:1.2.3"
        },
        {
            "entryUuid": "urn:uuid:d0000000-0000-4000-8000-000000000002",
            "uniqueId": "1.3.6.1.4.1.21367.2005.3.7.2002",
            "objectType": "urn:uuid:34268e47-fdf5-41a6-ba33-82133c465248",
            "confidentialityCodes": [{ "code": "R", "scheme": "2.16.840.1.113883.5.25" }]
        }
    ],
    "associations": [
        {
            "entryUuid": "urn:uuid:a0000000-0000-4000-8000-000000000001",
            "associationType": "urn:oasis:names:tc:ebxml-regrep:AssociationType:HasMember",
            "source": "urn:uuid:0f2b8a1e-5c3d-4e6f-8a9b-1c2d3e4f5a6b",
            "target": "urn:uuid:d0000000-0000-4000-8000-000000000001"
        },
        {
            "entryUuid": "urn:uuid:a0000000-0000-4000-8000-000000000002",
            "associationType": "urn:oasis:names:tc:ebxml-regrep:AssociationType:HasMember",
            "source": "urn:uuid:0f2b8a1e-5c3d-4e6f-8a9b-1c2d3e4f5a6b",
            "target": "urn:uuid:d0000000-0000-4000-8000-000000000002"
        }
    ]
}"#;

/// Creates a store loaded with [`REGISTRY_FIXTURE`].
pub fn create_store() -> InMemoryMetadataStore {
    InMemoryMetadataStore::from_json_str(REGISTRY_FIXTURE).expect("Failed to load fixture")
}

/// Execution step that records every call instead of querying a store.
#[derive(Default)]
pub struct RecordingStep {
    calls: Mutex<Vec<FolderAndContentsParams>>,
    failure: Option<String>,
}

impl RecordingStep {
    /// Creates a step that answers every call with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a step that fails every call with a query error.
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    /// Returns the number of times the step was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the parameters of the most recent call.
    pub fn last_call(&self) -> Option<FolderAndContentsParams> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl ExecutionStep<FolderAndContentsParams> for RecordingStep {
    async fn execute(&self, params: FolderAndContentsParams) -> BackendResult<QueryResult> {
        self.calls.lock().push(params);
        match &self.failure {
            Some(message) => Err(BackendError::QueryError {
                message: message.clone(),
            }),
            None => Ok(QueryResult::new()),
        }
    }
}

/// Builds a GetFolderAndContents pipeline over `step`.
pub fn folder_pipeline<E>(step: Arc<E>) -> StoredQueryPipeline<GetFolderAndContents, E>
where
    E: ExecutionStep<FolderAndContentsParams>,
{
    StoredQueryPipeline::new(
        GetFolderAndContents::new().expect("Failed to build GetFolderAndContents"),
        step,
    )
}
