//! In-memory metadata store.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{BackendError, BackendResult};
use crate::execution::ExecutionStep;
use crate::metadata;
use crate::types::{Association, DocumentEntry, Folder, QueryResult, RegistryObject};
use crate::variants::{DocumentsParams, FolderAndContentsParams, FoldersParams, ObjectRef};

const BACKEND_NAME: &str = "memory";

/// Registry content loaded into an [`InMemoryMetadataStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFixture {
    /// Folders.
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Document entries.
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
    /// Associations between folders and document entries.
    #[serde(default)]
    pub associations: Vec<Association>,
}

/// Metadata store holding registry objects in memory.
///
/// Safe for concurrent use; readers share the lock, fixture edits take it
/// exclusively.
pub struct InMemoryMetadataStore {
    state: RwLock<RegistryFixture>,
    online: AtomicBool,
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryMetadataStore")
            .field("folders", &state.folders.len())
            .field("documents", &state.documents.len())
            .field("associations", &state.associations.len())
            .field("online", &self.online.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::from_fixture(RegistryFixture::default())
    }

    /// Creates a store holding `fixture`.
    pub fn from_fixture(fixture: RegistryFixture) -> Self {
        Self {
            state: RwLock::new(fixture),
            online: AtomicBool::new(true),
        }
    }

    /// Parses a JSON fixture.
    pub fn from_json_str(json: &str) -> BackendResult<Self> {
        let fixture: RegistryFixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Loads a JSON fixture file.
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_json_str(&content)?;
        info!(path = %path.as_ref().display(), store = ?store, "Loaded registry fixture");
        Ok(store)
    }

    /// Adds a folder.
    pub fn add_folder(&self, folder: Folder) {
        self.state.write().folders.push(folder);
    }

    /// Adds a document entry.
    pub fn add_document(&self, document: DocumentEntry) {
        self.state.write().documents.push(document);
    }

    /// Links a document entry into a folder, returning the association UUID.
    pub fn add_member(&self, folder_uuid: &str, document_uuid: &str) -> String {
        let entry_uuid = format!("urn:uuid:{}", Uuid::new_v4());
        self.state.write().associations.push(Association {
            entry_uuid: entry_uuid.clone(),
            association_type: metadata::ASSOCIATION_HAS_MEMBER.to_string(),
            source: folder_uuid.to_string(),
            target: document_uuid.to_string(),
        });
        entry_uuid
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> BackendResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: "store is offline".to_string(),
            })
        }
    }
}

fn folder_matches(folder: &Folder, reference: &ObjectRef) -> bool {
    match reference {
        ObjectRef::EntryUuid(id) => folder.entry_uuid == *id,
        ObjectRef::UniqueId(id) => folder.unique_id == *id,
    }
}

fn document_matches(document: &DocumentEntry, reference: &ObjectRef) -> bool {
    match reference {
        ObjectRef::EntryUuid(id) => document.entry_uuid == *id,
        ObjectRef::UniqueId(id) => document.unique_id == *id,
    }
}

fn passes_filters(document: &DocumentEntry, params: &FolderAndContentsParams) -> bool {
    if !params.object_types.contains(&document.object_type) {
        return false;
    }
    if let Some(formats) = &params.format_codes {
        let matched = document
            .format_code
            .as_ref()
            .is_some_and(|fc| formats.iter().any(|wanted| wanted.matches(fc)));
        if !matched {
            return false;
        }
    }
    if let Some(filter) = &params.confidentiality_codes {
        if !filter.accepts(&document.confidentiality_codes) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ExecutionStep<FolderAndContentsParams> for InMemoryMetadataStore {
    async fn execute(&self, params: FolderAndContentsParams) -> BackendResult<QueryResult> {
        self.ensure_online()?;
        let state = self.state.read();

        let folder = state
            .folders
            .iter()
            .find(|f| folder_matches(f, &params.folder))
            .ok_or_else(|| BackendError::NotFound {
                object_type: "Folder".to_string(),
                identifier: params.folder.value().to_string(),
            })?;

        let mut result = QueryResult::new();
        result.push(RegistryObject::Folder(folder.clone()));

        let mut links = Vec::new();
        for association in state
            .associations
            .iter()
            .filter(|a| a.is_has_member() && a.source == folder.entry_uuid)
        {
            let Some(document) = state
                .documents
                .iter()
                .find(|d| d.entry_uuid == association.target)
            else {
                continue;
            };
            if passes_filters(document, &params) {
                result.push(RegistryObject::DocumentEntry(document.clone()));
                links.push(RegistryObject::Association(association.clone()));
            }
        }
        debug!(
            folder = %folder.entry_uuid,
            documents = links.len(),
            "Resolved folder contents"
        );
        result.objects.extend(links);

        Ok(result)
    }
}

#[async_trait]
impl ExecutionStep<FoldersParams> for InMemoryMetadataStore {
    async fn execute(&self, params: FoldersParams) -> BackendResult<QueryResult> {
        self.ensure_online()?;
        let state = self.state.read();

        let mut result = QueryResult::new();
        for folder in state
            .folders
            .iter()
            .filter(|f| params.folders.iter().any(|r| folder_matches(f, r)))
        {
            result.push(RegistryObject::Folder(folder.clone()));
        }
        Ok(result)
    }
}

#[async_trait]
impl ExecutionStep<DocumentsParams> for InMemoryMetadataStore {
    async fn execute(&self, params: DocumentsParams) -> BackendResult<QueryResult> {
        self.ensure_online()?;
        let state = self.state.read();

        let mut result = QueryResult::new();
        for document in state.documents.iter().filter(|d| {
            params.documents.iter().any(|r| document_matches(d, r))
                && params.home_community_id.as_deref().is_none_or(|wanted| {
                    d.home_community_id.as_deref().is_none_or(|hc| hc == wanted)
                })
        }) {
            result.push(RegistryObject::DocumentEntry(document.clone()));
        }
        Ok(result)
    }
}
