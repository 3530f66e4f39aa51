//! Decode-then-validate for untrusted shape candidates.

use serde_json::{Map, Value};
use tracing::debug;

use super::{Shape, ShapeKind, ShapeValidationError};

/// Turns one decoded JSON value into a typed [`Shape`].
///
/// The `type` tag and each field's presence and type are checked strictly.
/// Keys the tag does not define are stripped rather than failing the shape.
pub fn validate_shape(candidate: &Value) -> Result<Shape, ShapeValidationError> {
    let object = candidate
        .as_object()
        .ok_or(ShapeValidationError::NotAnObject)?;

    let tag = match object.get("type") {
        None => return Err(ShapeValidationError::MissingTag),
        Some(Value::String(tag)) => tag,
        Some(other) => return Err(ShapeValidationError::UnknownTag(other.to_string())),
    };
    let kind =
        ShapeKind::from_tag(tag).ok_or_else(|| ShapeValidationError::UnknownTag(tag.clone()))?;

    let allowed = kind.fields();
    let mut repaired = Map::with_capacity(object.len());
    for (key, value) in object {
        if key == "type" || allowed.contains(&key.as_str()) {
            repaired.insert(key.clone(), value.clone());
        } else {
            debug!(kind = kind.tag(), field = %key, "Stripping unknown shape field");
        }
    }

    let shape: Shape = serde_json::from_value(Value::Object(repaired)).map_err(|e| {
        ShapeValidationError::Malformed {
            kind: kind.tag(),
            reason: e.to_string(),
        }
    })?;
    shape.check()?;
    Ok(shape)
}

/// Like [`validate_shape`], but a missing tag is filled in with `implied`.
///
/// Used for side lists such as `texts`, where membership already names the kind.
pub fn validate_implied(
    candidate: &Value,
    implied: ShapeKind,
) -> Result<Shape, ShapeValidationError> {
    match candidate {
        Value::Object(object) if !object.contains_key("type") => {
            let mut tagged = object.clone();
            tagged.insert("type".to_string(), Value::String(implied.tag().to_string()));
            validate_shape(&Value::Object(tagged))
        }
        other => validate_shape(other),
    }
}
