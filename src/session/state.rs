use image::RgbaImage;

use super::timeline::Timeline;
use crate::capture::image::BaseImage;
use crate::config::{EditorConfig, StrokeColor};
use crate::domain::{GestureKind, Point, Stroke, Tool};
use crate::error::Result;
use crate::render::Compositor;

/// State of one editing session over a single base image.
///
/// Discarded when the session ends; nothing here outlives a save, export
/// or cancel.
#[derive(Clone, Debug)]
pub struct EditorSession {
    pub timeline: Timeline,
    pub tool: Tool,
    pub color: StrokeColor,
    pub line_width: f32,
    pub background: Option<StrokeColor>,
    /// Points of the gesture currently being drawn
    pub drawing: Option<Vec<Point>>,
    /// Where a text caption will go once its text is submitted
    pub text_anchor: Option<Point>,
    pub config: EditorConfig,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            timeline: Timeline::new(),
            tool: config.default_tool,
            color: config.stroke_color,
            line_width: config.clamp_line_width(config.line_width),
            background: config.background,
            drawing: None,
            text_anchor: None,
            config,
        }
    }

    /// Drop the live gesture and any pending caption
    pub fn cancel_drawing(&mut self) {
        self.drawing = None;
        self.text_anchor = None;
    }

    /// Build a stroke from `points` with the current tool and style
    pub fn make_stroke(&self, points: Vec<Point>, text: Option<String>) -> Result<Stroke> {
        Stroke::new(self.tool, points, self.color, self.line_width, text)
    }

    /// The gesture in progress as a stroke, if it is complete enough to draw
    pub fn in_progress(&self) -> Option<Stroke> {
        let points = self.drawing.as_ref()?;
        match self.tool.gesture() {
            GestureKind::Caption => return None,
            // Pressed but not dragged yet
            GestureKind::TwoPoint if points.first() == points.last() => return None,
            _ => {}
        }
        self.make_stroke(points.clone(), None).ok()
    }

    /// On-screen preview: committed strokes plus the live gesture on top
    pub fn preview(&self, compositor: &Compositor, base: &BaseImage) -> Result<RgbaImage> {
        let live = self.in_progress();
        compositor.render(
            base,
            self.timeline.current_strokes(),
            self.background,
            live.as_ref(),
        )
    }

    /// Flattened result at the base image's own size, for "save changes"
    pub fn flatten(&self, compositor: &Compositor, base: &BaseImage) -> Result<RgbaImage> {
        compositor.render(base, self.timeline.current_strokes(), self.background, None)
    }

    /// Padded, size-limited result for export files.
    ///
    /// Renders from a snapshot so the caller can hand the result to a
    /// background writer while editing continues.
    pub fn export_image(&self, compositor: &Compositor, base: &BaseImage) -> Result<RgbaImage> {
        let strokes = self.timeline.snapshot();
        compositor.render_export(base, &strokes, self.background, None)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
