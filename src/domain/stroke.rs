//! Stroke types for annotating screenshots
//!
//! All stroke points are stored in unscaled base image coordinates, so a
//! stroke renders identically at any zoom level or export scale.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::config::StrokeColor;
use crate::error::{Error, Result};

/// How a tool turns pointer input into points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    /// Continuous point stream
    Freehand,
    /// Bounding box from the first and last point
    TwoPoint,
    /// Single anchor point plus a caption
    Caption,
}

/// Annotation tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Highlighter,
    Arrow,
    Rectangle,
    Ellipse,
    Text,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Pen,
        Tool::Highlighter,
        Tool::Arrow,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Text,
    ];

    /// Minimum number of points a committed stroke of this tool needs
    pub fn min_points(self) -> usize {
        match self {
            Tool::Arrow | Tool::Rectangle | Tool::Ellipse => 2,
            Tool::Pen | Tool::Highlighter | Tool::Text => 1,
        }
    }

    pub fn gesture(self) -> GestureKind {
        match self {
            Tool::Pen | Tool::Highlighter => GestureKind::Freehand,
            Tool::Arrow | Tool::Rectangle | Tool::Ellipse => GestureKind::TwoPoint,
            Tool::Text => GestureKind::Caption,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Highlighter => "highlighter",
            Tool::Arrow => "arrow",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Text => "text",
        }
    }
}

/// One committed annotation action. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeRecord", into = "StrokeRecord")]
pub struct Stroke {
    tool: Tool,
    points: Vec<Point>,
    color: StrokeColor,
    line_width: f32,
    text: Option<String>,
}

impl Stroke {
    /// Build a stroke, rejecting point lists the tool cannot use.
    ///
    /// Color and width are taken as given; clamping the width is the
    /// caller's job.
    pub fn new(
        tool: Tool,
        points: Vec<Point>,
        color: StrokeColor,
        line_width: f32,
        text: Option<String>,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} stroke has no points",
                tool.name()
            )));
        }
        if tool == Tool::Text && text.is_none() {
            return Err(Error::InvalidInput("text stroke has no caption".into()));
        }
        if points.len() < tool.min_points() {
            return Err(Error::InvalidInput(format!(
                "{} stroke needs at least {} points, got {}",
                tool.name(),
                tool.min_points(),
                points.len()
            )));
        }
        Ok(Self {
            tool,
            points,
            color,
            line_width,
            text,
        })
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First and last point; for two-point tools these span the shape
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        Some((*self.points.first()?, *self.points.last()?))
    }

    /// Copy of this stroke with every point mapped through `p * scale + offset`
    /// and the width multiplied by `scale`
    pub(crate) fn transformed(&self, scale: f32, offset: f32) -> Stroke {
        Stroke {
            tool: self.tool,
            points: self
                .points
                .iter()
                .map(|p| p.scaled(scale).translated(offset, offset))
                .collect(),
            color: self.color,
            line_width: self.line_width * scale,
            text: self.text.clone(),
        }
    }
}

/// Serialized form of a stroke; goes through [`Stroke::new`] on load
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StrokeRecord {
    tool: Tool,
    points: Vec<Point>,
    color: StrokeColor,
    line_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = Error;

    fn try_from(r: StrokeRecord) -> Result<Self> {
        Stroke::new(r.tool, r.points, r.color, r.line_width, r.text)
    }
}

impl From<Stroke> for StrokeRecord {
    fn from(s: Stroke) -> Self {
        Self {
            tool: s.tool,
            points: s.points,
            color: s.color,
            line_width: s.line_width,
            text: s.text,
        }
    }
}
