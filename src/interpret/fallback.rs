//! Rule-based interpreter: keyword table plus a `write <text>` pattern.
//!
//! Pure and deterministic. It cannot fail; an unrecognised prompt simply
//! yields no shapes.

use regex::Regex;
use std::sync::OnceLock;

use crate::shapes::{Points, Shape, ShapeKind};

/// Horizontal distance between successive keyword shapes.
pub const LAYOUT_STEP: i32 = 120;
pub const LAYOUT_ORIGIN_X: i32 = 100;

/// Checked in this order; each keyword yields at most one shape.
const KEYWORDS: [(&str, ShapeKind); 7] = [
    ("rectangle", ShapeKind::Rectangle),
    ("rect", ShapeKind::Rectangle),
    ("circle", ShapeKind::Circle),
    ("ellipse", ShapeKind::Ellipse),
    ("square", ShapeKind::Rectangle),
    ("text", ShapeKind::Text),
    ("line", ShapeKind::Line),
];

fn keyword_patterns() -> &'static [(Regex, ShapeKind)] {
    static PATTERNS: OnceLock<Vec<(Regex, ShapeKind)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        KEYWORDS
            .iter()
            .filter_map(|(keyword, kind)| {
                // whole word, optional plural: "rect" must not fire inside "rectangle"
                Regex::new(&format!(r"\b{}s?\b", regex::escape(keyword)))
                    .ok()
                    .map(|regex| (regex, *kind))
            })
            .collect()
    })
}

fn write_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\bwrite\s+(.+)").ok())
        .as_ref()
}

pub fn interpret_fallback(text: &str) -> Vec<Shape> {
    let lowered = text.to_lowercase();
    let mut shapes = Vec::new();

    for (pattern, kind) in keyword_patterns() {
        if pattern.is_match(&lowered) {
            shapes.push(keyword_shape(*kind, shapes.len()));
        }
    }

    if let Some(written) = write_pattern()
        .and_then(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
        .filter(|written| !written.is_empty())
    {
        shapes.push(Shape::Text {
            text: written.to_string(),
            x: 200,
            y: 350,
            font_size: 28,
            color: "purple".to_string(),
        });
    }

    shapes
}

fn keyword_shape(kind: ShapeKind, placed: usize) -> Shape {
    let x = LAYOUT_ORIGIN_X + LAYOUT_STEP * placed as i32;

    match kind {
        ShapeKind::Rectangle => Shape::Rectangle {
            x,
            y: 100,
            width: 100,
            height: 60,
            color: Some("blue".to_string()),
        },
        ShapeKind::Circle => Shape::Circle {
            x,
            y: 200,
            radius: 50,
            color: Some("red".to_string()),
        },
        ShapeKind::Ellipse => Shape::Ellipse {
            x,
            y: 300,
            radius_x: 60,
            radius_y: 30,
            color: Some("green".to_string()),
        },
        ShapeKind::Text => Shape::Text {
            text: "Sample Text".to_string(),
            x,
            y: 250,
            font_size: 24,
            color: "black".to_string(),
        },
        ShapeKind::Line => Shape::Line {
            points: Points::Flat(vec![x as f64, 400.0, (x + 100) as f64, 400.0]),
            stroke: "black".to_string(),
            stroke_width: 2,
        },
    }
}
