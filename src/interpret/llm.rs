use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::transport::{CompletionTransport, GeminiTransport};
use super::{InterpretError, InterpretResult};
use crate::config::ModelConfig;
use crate::shapes::{validate_implied, validate_shape, Shape, ShapeKind};

const SYSTEM_PROMPT: &str = r#"You convert drawing instructions into JSON for a Konva JS canvas.

Return ONLY a JSON object with a single key "shapes": a list of shape objects.
Every shape has a "type" field, which is one of:
- "rectangle": "x", "y" (top-left corner), "width", "height", optional "color"
- "circle": "x", "y" (center), "radius", optional "color"
- "ellipse": "x", "y" (center), "radiusX", "radiusY", optional "color"
- "line": "points" (flat list [x1, y1, x2, y2, ...]), "stroke" (color), "strokeWidth"
- "text": "text", "x", "y", optional "fontSize" (default 24), optional "color" (default "black")

Rules:
1. Coordinates and sizes are whole pixel numbers; sizes are positive.
2. Do not add fields that are not listed for the shape type.
3. If nothing should be drawn, return {"shapes": []}.

Example
Prompt: a blue box with Hello under it
Output: {"shapes": [{"type": "rectangle", "x": 100, "y": 100, "width": 200, "height": 100, "color": "blue"}, {"type": "text", "text": "Hello", "x": 150, "y": 250, "fontSize": 24, "color": "black"}]}"#;

/// Client for the hosted model. The credential and transport are injected,
/// never read from ambient state at call time.
pub struct LlmClient {
    api_key: Option<String>,
    transport: Arc<dyn CompletionTransport>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &ModelConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            transport,
            timeout: config.timeout(),
        }
    }

    /// Client backed by the Gemini REST transport.
    pub fn from_config(config: &ModelConfig) -> InterpretResult<Self> {
        let transport = GeminiTransport::new(config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One model round-trip, bounded by the configured timeout.
    #[instrument(skip(self, text), fields(transport = self.transport.name()))]
    pub async fn call_model(&self, text: &str) -> InterpretResult<Vec<Shape>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InterpretError::Configuration)?;

        let prompt = build_prompt(text);
        debug!(prompt = %prompt, "Issuing model request");

        let raw = tokio::time::timeout(self.timeout, self.transport.complete(api_key, &prompt))
            .await
            .map_err(|_| InterpretError::ModelInvocation {
                reason: format!("Timeout after {} seconds", self.timeout.as_secs()),
            })??;
        debug!(raw = %raw, "Model raw response received");

        let shapes = parse_model_output(&raw)?;
        debug!(count = shapes.len(), shapes = ?shapes, "Model response parsed");
        Ok(shapes)
    }
}

pub fn build_prompt(text: &str) -> String {
    format!("{}\n\nPrompt: {}\nOutput:", SYSTEM_PROMPT, text)
}

/// Removes every line that opens or closes a fenced code block.
pub fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Decodes model text into shapes, dropping candidates that fail validation.
///
/// A `shapes` array is required. Optional `texts` and `lines` arrays, which
/// models sometimes emit alongside it, are read as text and line shapes.
pub fn parse_model_output(raw: &str) -> InterpretResult<Vec<Shape>> {
    let cleaned = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| InterpretError::ResponseParse {
            reason: format!("Invalid JSON: {}", e),
        })?;

    let primary = match value.get("shapes") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(InterpretError::ResponseParse {
                reason: "`shapes` is not a list".to_string(),
            })
        }
        None => {
            return Err(InterpretError::ResponseParse {
                reason: "Response has no `shapes` key".to_string(),
            })
        }
    };

    let mut candidates: Vec<(&Value, Option<ShapeKind>)> =
        primary.iter().map(|item| (item, None)).collect();
    for (key, kind) in [("texts", ShapeKind::Text), ("lines", ShapeKind::Line)] {
        if let Some(Value::Array(items)) = value.get(key) {
            candidates.extend(items.iter().map(|item| (item, Some(kind))));
        }
    }

    let total = candidates.len();
    let shapes: Vec<Shape> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, (item, implied))| {
            let result = match implied {
                Some(kind) => validate_implied(item, kind),
                None => validate_shape(item),
            };
            match result {
                Ok(shape) => Some(shape),
                Err(e) => {
                    warn!(index, error = %e, "Dropping invalid shape from model response");
                    None
                }
            }
        })
        .collect();

    if total > 0 && shapes.is_empty() {
        return Err(InterpretError::ResponseParse {
            reason: format!("All {} shapes failed validation", total),
        });
    }

    Ok(shapes)
}
