//! Model first, rules second; the answer is always a shape list.

use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::fallback::interpret_fallback;
use super::llm::LlmClient;
use super::InterpretError;
use crate::shapes::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Interpretation {
    pub shapes: Vec<Shape>,
    pub source: InterpretationSource,
}

pub struct Interpreter {
    llm: LlmClient,
}

impl Interpreter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Shapes for `text`, never an error.
    pub async fn parse_prompt(&self, text: &str) -> Vec<Shape> {
        self.interpret(text).await.shapes
    }

    #[instrument(skip(self, text), fields(prompt_length = text.len()))]
    pub async fn interpret(&self, text: &str) -> Interpretation {
        let start = Instant::now();

        let (shapes, source) = if text.trim().is_empty() {
            debug!("Blank prompt, skipping model");
            (interpret_fallback(text), InterpretationSource::Fallback)
        } else {
            match self.llm.call_model(text).await {
                Ok(shapes) => (shapes, InterpretationSource::Model),
                Err(e) => {
                    log_model_failure(&e);
                    (interpret_fallback(text), InterpretationSource::Fallback)
                }
            }
        };

        let shapes = normalize(shapes);
        info!(
            source = ?source,
            count = shapes.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "Prompt interpreted"
        );

        Interpretation { shapes, source }
    }
}

fn log_model_failure(error: &InterpretError) {
    match error {
        InterpretError::Configuration => {
            debug!("Model not configured, using rule-based interpreter")
        }
        _ => warn!(error = %error, "Model interpretation failed, using rule-based interpreter"),
    }
}

/// Flattens paired line points; a no-op on already-flat lists.
pub fn normalize(shapes: Vec<Shape>) -> Vec<Shape> {
    shapes.into_iter().map(Shape::normalized).collect()
}
