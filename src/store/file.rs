//! One JSON file per board under a directory.
//!
//! File names are the BLAKE3 digest of the id, so any id string maps to a
//! safe, fixed-length name; the id itself lives in the document's `_id`.
//! Writes go to a uniquely named temp file first and are renamed into place,
//! so readers never observe a half-written board.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use serde_json::Value;

use super::{
    prepare, select_recent, summarize, validate_id, Document, DocumentStore, SessionSummary,
    StoreResult, ID_FIELD,
};

const EXTENSION: &str = "json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the store directory.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        let digest = blake3::hash(id.as_bytes());
        self.root.join(format!("{}.{}", digest.to_hex(), EXTENSION))
    }

    async fn read(&self, path: &Path) -> StoreResult<Option<Document>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    #[instrument(skip(self, document), fields(root = %self.root.display()))]
    async fn save(&self, document: Document) -> StoreResult<Document> {
        let (id, document) = prepare(document, Utc::now())?;
        let bytes = serde_json::to_vec(&document)?;

        let temp = self.root.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, self.path_for(&id)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(id = %id, bytes = bytes.len(), "Board written");
        Ok(document)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        // an id that could never have been saved is simply absent
        if validate_id(id).is_err() {
            return Ok(None);
        }
        let document = self.read(&self.path_for(id)).await?;
        Ok(document.filter(|doc| doc.get(ID_FIELD).and_then(Value::as_str) == Some(id)))
    }

    async fn recent(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<SessionSummary>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            match self.read(&path).await {
                Ok(Some(document)) => {
                    if let Some(id) = document.get(ID_FIELD).and_then(Value::as_str) {
                        entries.extend(summarize(id, &document));
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable board"),
            }
        }

        Ok(select_recent(entries, since, limit))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
