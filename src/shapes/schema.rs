//! Canvas primitives exactly as the drawing surface consumes them.

use serde::{Deserialize, Deserializer, Serialize};

use super::ShapeValidationError;

pub const DEFAULT_FONT_SIZE: u32 = 24;
pub const DEFAULT_TEXT_COLOR: &str = "black";

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

// An explicit `null` means the same as an absent key.
fn font_size_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_font_size))
}

fn text_color_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_text_color))
}

/// One drawable primitive, tagged by `type` on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Circle {
        x: i32,
        y: i32,
        radius: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Ellipse {
        x: i32,
        y: i32,
        #[serde(rename = "radiusX")]
        radius_x: u32,
        #[serde(rename = "radiusY")]
        radius_y: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Line {
        points: Points,
        stroke: String,
        #[serde(rename = "strokeWidth")]
        stroke_width: u32,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        #[serde(
            rename = "fontSize",
            default = "default_font_size",
            deserialize_with = "font_size_or_default"
        )]
        font_size: u32,
        #[serde(default = "default_text_color", deserialize_with = "text_color_or_default")]
        color: String,
    },
}

/// The closed set of `type` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Text,
}

impl ShapeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(ShapeKind::Rectangle),
            "circle" => Some(ShapeKind::Circle),
            "ellipse" => Some(ShapeKind::Ellipse),
            "line" => Some(ShapeKind::Line),
            "text" => Some(ShapeKind::Text),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Text => "text",
        }
    }

    /// Wire field names a shape of this kind may carry, besides `type`.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            ShapeKind::Rectangle => &["x", "y", "width", "height", "color"],
            ShapeKind::Circle => &["x", "y", "radius", "color"],
            ShapeKind::Ellipse => &["x", "y", "radiusX", "radiusY", "color"],
            ShapeKind::Line => &["points", "stroke", "strokeWidth"],
            ShapeKind::Text => &["text", "x", "y", "fontSize", "color"],
        }
    }
}

/// Line vertices, either flat `[x0, y0, x1, y1, ..]` or paired `[[x0, y0], ..]`.
///
/// Models tend to emit pairs; the canvas only understands the flat form,
/// so [`Shape::normalized`] rewrites pairs before anything leaves the crate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Points {
    Flat(Vec<f64>),
    Pairs(Vec<[f64; 2]>),
}

impl Points {
    pub fn flatten(self) -> Self {
        match self {
            Points::Flat(values) => Points::Flat(values),
            Points::Pairs(pairs) => Points::Flat(pairs.into_iter().flatten().collect()),
        }
    }

    /// Number of scalar coordinates once flattened.
    pub fn coordinate_count(&self) -> usize {
        match self {
            Points::Flat(values) => values.len(),
            Points::Pairs(pairs) => pairs.len() * 2,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Points::Flat(_))
    }

    fn all_finite(&self) -> bool {
        match self {
            Points::Flat(values) => values.iter().all(|v| v.is_finite()),
            Points::Pairs(pairs) => pairs.iter().flatten().all(|v| v.is_finite()),
        }
    }
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Text { .. } => ShapeKind::Text,
        }
    }

    /// Rewrites paired line points into the flat form. Idempotent.
    pub fn normalized(self) -> Self {
        match self {
            Shape::Line {
                points,
                stroke,
                stroke_width,
            } => Shape::Line {
                points: points.flatten(),
                stroke,
                stroke_width,
            },
            other => other,
        }
    }

    /// Value constraints serde cannot express: positive sizes, non-empty
    /// text, enough line vertices.
    pub fn check(&self) -> Result<(), ShapeValidationError> {
        let kind = self.kind();
        let positive = |field: &'static str, value: u32| {
            if value == 0 {
                Err(ShapeValidationError::Constraint {
                    kind: kind.tag(),
                    field,
                    reason: "must be a positive integer",
                })
            } else {
                Ok(())
            }
        };

        match self {
            Shape::Rectangle { width, height, .. } => {
                positive("width", *width)?;
                positive("height", *height)
            }
            Shape::Circle { radius, .. } => positive("radius", *radius),
            Shape::Ellipse {
                radius_x, radius_y, ..
            } => {
                positive("radiusX", *radius_x)?;
                positive("radiusY", *radius_y)
            }
            Shape::Line {
                points,
                stroke_width,
                ..
            } => {
                let count = points.coordinate_count();
                if count < 4 || count % 2 != 0 {
                    return Err(ShapeValidationError::Constraint {
                        kind: kind.tag(),
                        field: "points",
                        reason: "needs an even number of coordinates, at least two vertices",
                    });
                }
                if !points.all_finite() {
                    return Err(ShapeValidationError::Constraint {
                        kind: kind.tag(),
                        field: "points",
                        reason: "coordinates must be finite numbers",
                    });
                }
                positive("strokeWidth", *stroke_width)
            }
            Shape::Text {
                text, font_size, ..
            } => {
                if text.trim().is_empty() {
                    return Err(ShapeValidationError::Constraint {
                        kind: kind.tag(),
                        field: "text",
                        reason: "must not be empty",
                    });
                }
                positive("fontSize", *font_size)
            }
        }
    }
}
