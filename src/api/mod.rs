//! HTTP surface consumed by the canvas front end.

pub mod error;
pub mod interpret;
pub mod session;

pub use error::ApiError;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::interpret::Interpreter;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub interpreter: Arc<Interpreter>,
    pub store: Arc<dyn DocumentStore>,
    pub max_prompt_length: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/interpret", post(interpret::interpret_prompt))
        .route("/api/interpret/", post(interpret::interpret_prompt))
        .route("/api/save", post(session::save_board))
        .route("/api/session/:session_id", get(session::get_board))
        .route("/api/sessions", get(session::recent_boards))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

#[cfg(test)]
mod tests;
