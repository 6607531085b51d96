//! Shape model.
//!
//! `Shape` is a closed tagged variant over every kind a client can draw. Payload
//! parsing and delete matching each dispatch through a single exhaustive `match`,
//! so adding a kind is a compile-checked change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 線のスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrokeStyle {
    Solid,
    Dashed,
    Dotted,
}

/// 図形の種類（ワイヤー上の `shapeType`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Pen,
    Line,
    LineWithArrow,
    Diamond,
    Text,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "RECTANGLE",
            ShapeKind::Ellipse => "ELLIPSE",
            ShapeKind::Pen => "PEN",
            ShapeKind::Line => "LINE",
            ShapeKind::LineWithArrow => "LINE_WITH_ARROW",
            ShapeKind::Diamond => "DIAMOND",
            ShapeKind::Text => "TEXT",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseData {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Freehand path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenData {
    pub points: Vec<Point>,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

/// Straight line, also used for the arrow variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiamondData {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
}

/// Text label. Has no stroke fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub color: String,
}

/// ホワイトボード上の図形
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(RectangleData),
    Ellipse(EllipseData),
    Pen(PenData),
    Line(LineData),
    LineWithArrow(LineData),
    Diamond(DiamondData),
    Text(TextData),
}

impl Shape {
    /// Parse a `shapeData` payload for the declared kind.
    ///
    /// A payload that lacks any field required by `kind` is rejected.
    pub fn from_payload(
        kind: ShapeKind,
        payload: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let shape = match kind {
            ShapeKind::Rectangle => Shape::Rectangle(RectangleData::deserialize(payload)?),
            ShapeKind::Ellipse => Shape::Ellipse(EllipseData::deserialize(payload)?),
            ShapeKind::Pen => Shape::Pen(PenData::deserialize(payload)?),
            ShapeKind::Line => Shape::Line(LineData::deserialize(payload)?),
            ShapeKind::LineWithArrow => Shape::LineWithArrow(LineData::deserialize(payload)?),
            ShapeKind::Diamond => Shape::Diamond(DiamondData::deserialize(payload)?),
            ShapeKind::Text => Shape::Text(TextData::deserialize(payload)?),
        };
        Ok(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Pen(_) => ShapeKind::Pen,
            Shape::Line(_) => ShapeKind::Line,
            Shape::LineWithArrow(_) => ShapeKind::LineWithArrow,
            Shape::Diamond(_) => ShapeKind::Diamond,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    /// Exact field-by-field comparison of the geometry used to look up a shape
    /// for deletion. Style fields are ignored; kinds must match.
    pub fn matches_geometry(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rectangle(a), Shape::Rectangle(b)) => {
                a.x == b.x && a.y == b.y && a.width == b.width && a.height == b.height
            }
            (Shape::Ellipse(a), Shape::Ellipse(b)) => {
                a.center_x == b.center_x
                    && a.center_y == b.center_y
                    && a.radius_x == b.radius_x
                    && a.radius_y == b.radius_y
            }
            (Shape::Pen(a), Shape::Pen(b)) => a.points == b.points,
            (Shape::Line(a), Shape::Line(b)) | (Shape::LineWithArrow(a), Shape::LineWithArrow(b)) => {
                a.start_x == b.start_x
                    && a.start_y == b.start_y
                    && a.end_x == b.end_x
                    && a.end_y == b.end_y
            }
            (Shape::Diamond(a), Shape::Diamond(b)) => {
                a.center_x == b.center_x
                    && a.center_y == b.center_y
                    && a.width == b.width
                    && a.height == b.height
            }
            (Shape::Text(a), Shape::Text(b)) => a.x == b.x && a.y == b.y && a.content == b.content,
            _ => false,
        }
    }

    /// Serialize the typed payload back to `shapeData` form.
    pub fn to_payload(&self) -> serde_json::Value {
        let value = match self {
            Shape::Rectangle(data) => serde_json::to_value(data),
            Shape::Ellipse(data) => serde_json::to_value(data),
            Shape::Pen(data) => serde_json::to_value(data),
            Shape::Line(data) | Shape::LineWithArrow(data) => serde_json::to_value(data),
            Shape::Diamond(data) => serde_json::to_value(data),
            Shape::Text(data) => serde_json::to_value(data),
        };
        // Plain structs of numbers and strings always serialize.
        value.unwrap_or(serde_json::Value::Null)
    }
}
