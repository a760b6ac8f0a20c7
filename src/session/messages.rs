//! Message types for an editing session
//!
//! The host UI translates pointer and toolbar events into these.

use crate::config::StrokeColor;
use crate::domain::{Point, Tool};

// ============================================================================
// Gesture Types
// ============================================================================

/// Pointer gesture in base image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pointer pressed
    Begin(Point),
    /// Pointer dragged
    Move(Point),
    /// Pointer released
    End(Point),
}

/// All drawing/annotation messages
#[derive(Debug, Clone, PartialEq)]
pub enum DrawMsg {
    /// Pointer input for the selected tool
    Gesture(Gesture),
    /// Switch tools (abandons any stroke in progress)
    SelectTool(Tool),
    /// Color for subsequent strokes
    SetColor(StrokeColor),
    /// Brush size for subsequent strokes (clamped to the configured range)
    SetLineWidth(f32),
    /// Canvas fill behind the screenshot
    SetBackground(Option<StrokeColor>),
    /// Caption entered for the pending text anchor
    SubmitText(String),
    /// Caption entry dismissed
    CancelText,
    Undo,
    Redo,
    ClearAll,
}

impl DrawMsg {
    pub fn begin(x: f32, y: f32) -> Self {
        Self::Gesture(Gesture::Begin(Point::new(x, y)))
    }
    pub fn move_to(x: f32, y: f32) -> Self {
        Self::Gesture(Gesture::Move(Point::new(x, y)))
    }
    pub fn end(x: f32, y: f32) -> Self {
        Self::Gesture(Gesture::End(Point::new(x, y)))
    }
}
