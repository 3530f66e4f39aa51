use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{prepare, select_recent, summarize, Document, DocumentStore, SessionSummary, StoreResult};

/// Process-local store; contents vanish on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self, document))]
    async fn save(&self, document: Document) -> StoreResult<Document> {
        let (id, document) = prepare(document, Utc::now())?;
        self.documents
            .write()
            .await
            .insert(id.clone(), document.clone());
        debug!(id = %id, "Board stored");
        Ok(document)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn recent(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<SessionSummary>> {
        let documents = self.documents.read().await;
        let entries = documents
            .iter()
            .filter_map(|(id, document)| summarize(id, document));
        Ok(select_recent(entries, since, limit))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
