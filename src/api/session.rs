//! Board persistence endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{ApiError, AppState};
use crate::store::{Document, SessionSummary, ID_FIELD, RECENT_WINDOW_DAYS};

pub const MAX_RECENT: usize = 50;

#[derive(Deserialize, Debug, Default)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize, Debug)]
pub struct RecentResponse {
    pub sessions: Vec<SessionSummary>,
}

/// `POST /api/save`
pub async fn save_board(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Value::Object(document) = body else {
        return Err(ApiError::BadRequest(
            "Board must be a JSON object".to_string(),
        ));
    };

    let stored = state.store.save(document).await?;
    let id = stored
        .get(ID_FIELD)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    info!(id, store = state.store.name(), "Board saved");
    Ok(Json(json!({ "status": "ok" })))
}

/// `GET /api/session/:session_id`
pub async fn get_board(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let mut document = state
        .store
        .get(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    document.insert(ID_FIELD.to_string(), Value::String(session_id));
    Ok(Json(document))
}

/// `GET /api/sessions`
pub async fn recent_boards(
    State(state): State<AppState>,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> Result<Json<RecentResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = query.limit.unwrap_or(MAX_RECENT).min(MAX_RECENT);
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let sessions = state.store.recent(since, limit).await?;
    Ok(Json(RecentResponse { sessions }))
}
