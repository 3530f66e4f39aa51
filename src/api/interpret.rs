use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::shapes::Shape;

#[derive(Deserialize, Debug)]
pub struct InterpretRequest {
    pub prompt: String,
}

#[derive(Serialize, Debug)]
pub struct InterpretResponse {
    pub shapes: Vec<Shape>,
}

/// `POST /api/interpret/`
pub async fn interpret_prompt(
    State(state): State<AppState>,
    payload: Result<Json<InterpretRequest>, JsonRejection>,
) -> Result<Json<InterpretResponse>, ApiError> {
    let Json(request) = payload?;

    let length = request.prompt.chars().count();
    if length > state.max_prompt_length {
        return Err(ApiError::RequestValidation(format!(
            "Prompt too long: {} > {} characters",
            length, state.max_prompt_length
        )));
    }

    let span = info_span!("interpret_request", request_id = %Uuid::new_v4());
    let interpretation = state
        .interpreter
        .interpret(&request.prompt)
        .instrument(span)
        .await;

    Ok(Json(InterpretResponse {
        shapes: interpretation.shapes,
    }))
}
