//! # Prompt interpretation
//!
//! Turns a free-text drawing instruction into validated canvas shapes.
//!
//! ```text
//! prompt → Interpreter ─┬─ LlmClient (model, bounded by a timeout) ─┐
//!                       └─ fallback (keywords + "write …") ─────────┴→ normalize → shapes
//! ```
//!
//! The model path is tried first. Any failure on it (no credential, network
//! trouble, unusable output) is logged and absorbed, and the rule-based
//! interpreter answers instead, so callers always get a shape list.

pub mod fallback;
pub mod llm;
pub mod orchestrator;
pub mod transport;

pub use fallback::interpret_fallback;
pub use llm::LlmClient;
pub use orchestrator::{Interpretation, InterpretationSource, Interpreter};
pub use transport::{CompletionTransport, GeminiTransport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Model credential is not configured")]
    Configuration,

    #[error("Model invocation failed: {reason}")]
    ModelInvocation { reason: String },

    #[error("Model response could not be parsed: {reason}")]
    ResponseParse { reason: String },
}

pub type InterpretResult<T> = Result<T, InterpretError>;
