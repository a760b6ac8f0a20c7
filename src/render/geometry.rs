//! Shared geometry calculations for stroke rasterization
//!
//! Constants and math used by the compositor, kept free of any
//! rasterizer types so they can be tested directly.

use crate::domain::Point;

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Shortest arrowhead segment, in image pixels
    pub const MIN_HEAD_LENGTH: f32 = 15.0;
    /// Arrowhead segment length as a multiple of the line width
    pub const HEAD_LENGTH_PER_WIDTH: f32 = 3.0;
    /// Half-angle between the shaft and each head segment (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    pub fn head_length(line_width: f32) -> f32 {
        MIN_HEAD_LENGTH.max(line_width * HEAD_LENGTH_PER_WIDTH)
    }

    /// Far ends of the two head segments, both drawn back from `end`
    pub fn head_points(start: Point, end: Point, line_width: f32) -> [Point; 2] {
        let angle = (end.y - start.y).atan2(end.x - start.x);
        let length = head_length(line_width);
        let back = |a: f32| Point::new(end.x - length * a.cos(), end.y - length * a.sin());
        [back(angle - HEAD_ANGLE), back(angle + HEAD_ANGLE)]
    }
}

/// Shape (rectangle/ellipse) constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Text caption constants
pub mod text {
    /// Smallest caption size in pixels
    pub const MIN_FONT_SIZE: f32 = 12.0;
    /// Caption size as a multiple of the line width
    pub const FONT_SIZE_PER_WIDTH: f32 = 3.0;

    pub fn font_size(line_width: f32) -> f32 {
        MIN_FONT_SIZE.max(line_width * FONT_SIZE_PER_WIDTH)
    }
}

/// Highlighter alpha applied at render time regardless of the stored color
pub const HIGHLIGHTER_ALPHA: f32 = 0.5;

/// Padded export layout constants
pub mod export {
    /// Longest side of the base image after export downscaling
    pub const MAX_SIDE: u32 = 2048;
    /// Border added on every side of the scaled image
    pub const PADDING: u32 = 220;
}

/// Placement of the base image inside the padded export canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportLayout {
    /// Uniform factor applied to the base image, strokes and widths
    pub scale: f32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Offset of the scaled image from the canvas origin on both axes
    pub offset: u32,
}

impl ExportLayout {
    /// Map an image-space point into export canvas space
    pub fn map_point(&self, p: Point) -> Point {
        let o = self.offset as f32;
        p.scaled(self.scale).translated(o, o)
    }
}

/// Compute the padded export layout for a base image of `width` x `height`
pub fn export_layout(width: u32, height: u32) -> ExportLayout {
    let longest = width.max(height).max(1);
    let scale = (export::MAX_SIDE as f32 / longest as f32).min(1.0);
    let scaled_width = ((width as f32 * scale).round() as u32).max(1);
    let scaled_height = ((height as f32 * scale).round() as u32).max(1);
    ExportLayout {
        scale,
        scaled_width,
        scaled_height,
        canvas_width: scaled_width + 2 * export::PADDING,
        canvas_height: scaled_height + 2 * export::PADDING,
        offset: export::PADDING,
    }
}
