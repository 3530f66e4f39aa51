//! Board documents: arbitrary JSON objects keyed by a string `_id`.
//!
//! Two backends share one trait: an in-memory map for development and tests,
//! and a directory of JSON files for anything that should survive a restart.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
/// Boards older than this drop out of the recent list.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("_id (session id) is required")]
    MissingId,

    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upserts `document` under its `_id`, stamping `created_at`.
    async fn save(&self, document: Document) -> StoreResult<Document>;

    async fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Documents saved at or after `since`, newest first.
    async fn recent(&self, since: DateTime<Utc>, limit: usize) -> StoreResult<Vec<SessionSummary>>;

    fn name(&self) -> &'static str;
}

/// Any non-empty string is a usable id; backends map it to storage keys.
pub fn validate_id(id: &str) -> StoreResult<()> {
    if id.is_empty() {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Pulls the `_id` out of a document and stamps a fresh `created_at`.
pub fn prepare(mut document: Document, now: DateTime<Utc>) -> StoreResult<(String, Document)> {
    let id = match document.get(ID_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(other) => return Err(StoreError::InvalidId(other.to_string())),
        None => return Err(StoreError::MissingId),
    };
    validate_id(&id)?;

    document.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Ok((id, document))
}

/// Summary of a stored document, if its `created_at` is readable.
pub(crate) fn summarize(id: &str, document: &Document) -> Option<(DateTime<Utc>, SessionSummary)> {
    let created_at = document.get(CREATED_AT_FIELD)?.as_str()?;
    let parsed = DateTime::parse_from_rfc3339(created_at).ok()?.with_timezone(&Utc);
    Some((
        parsed,
        SessionSummary {
            id: id.to_string(),
            created_at: created_at.to_string(),
        },
    ))
}

/// Filters to `since`, sorts newest first, truncates to `limit`.
pub(crate) fn select_recent<I>(entries: I, since: DateTime<Utc>, limit: usize) -> Vec<SessionSummary>
where
    I: IntoIterator<Item = (DateTime<Utc>, SessionSummary)>,
{
    let mut recent: Vec<_> = entries
        .into_iter()
        .filter(|(created_at, _)| *created_at >= since)
        .collect();
    recent.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
    recent
        .into_iter()
        .take(limit)
        .map(|(_, summary)| summary)
        .collect()
}

#[cfg(test)]
mod tests;
