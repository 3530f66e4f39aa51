//! Shape schema shared by every interpreter and the HTTP layer.

pub mod schema;
pub mod validator;

pub use schema::{Points, Shape, ShapeKind, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR};
pub use validator::{validate_implied, validate_shape};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeValidationError {
    #[error("Shape is not a JSON object")]
    NotAnObject,
    #[error("Shape has no `type` tag")]
    MissingTag,
    #[error("Unknown shape type: {0}")]
    UnknownTag(String),
    #[error("Malformed {kind}: {reason}")]
    Malformed { kind: &'static str, reason: String },
    #[error("Invalid {kind}.{field}: {reason}")]
    Constraint {
        kind: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}
