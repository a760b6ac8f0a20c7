//! Stroke compositing using tiny-skia
//!
//! Strokes are rasterized onto a transparent overlay pixmap which is then
//! blended onto the canvas. Pixels no stroke touches keep the exact value
//! of the base image.

use fontdue::Font;
use image::{Rgba, RgbaImage, imageops};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

use super::geometry::{self, arrow, shape, text as caption};
use super::text;
use crate::capture::image::BaseImage;
use crate::config::{EditorConfig, StrokeColor};
use crate::domain::{Bounds, Point, Stroke, Tool};
use crate::error::{Error, Result};

/// Flattens a base image and an ordered stroke list into one bitmap
#[derive(Clone, Default)]
pub struct Compositor {
    /// Font for text captions; text strokes are skipped without one
    font: Option<Font>,
}

impl Compositor {
    /// Compositor without a caption font
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: Font) -> Self {
        Self { font: Some(font) }
    }

    /// Load the configured caption font, falling back to a system font
    pub fn from_config(config: &EditorConfig) -> Self {
        let path = config.font_path.clone().or_else(text::find_system_font);
        let font = match path {
            Some(path) => match text::load_font_file(&path) {
                Ok(font) => {
                    log::debug!("Loaded caption font {}", path.display());
                    Some(font)
                }
                Err(err) => {
                    log::warn!("Text captions disabled: {}", err);
                    None
                }
            },
            None => {
                log::warn!("No caption font found, text strokes will not render");
                None
            }
        };
        Self { font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Composite `strokes` (then `in_progress`, if any) over `base`.
    ///
    /// A background that is set and not fully transparent fills the canvas
    /// before the base is drawn; otherwise the canvas starts as an exact
    /// copy of the base.
    pub fn render(
        &self,
        base: &BaseImage,
        strokes: &[Stroke],
        background: Option<StrokeColor>,
        in_progress: Option<&Stroke>,
    ) -> Result<RgbaImage> {
        base.validate()?;
        let img = base.rgba();

        let mut canvas = match background.filter(|c| !c.is_transparent()) {
            Some(bg) => {
                let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), Rgba(bg.to_rgba_u8()));
                imageops::overlay(&mut canvas, img, 0, 0);
                canvas
            }
            None => img.clone(),
        };

        self.draw_strokes(&mut canvas, strokes.iter().chain(in_progress))?;
        Ok(canvas)
    }

    /// Composite for final output files.
    ///
    /// The base is shrunk so its longest side fits the export limit, centered
    /// in a fixed padding border, and every stroke is mapped through the same
    /// scale and offset so it stays aligned with the shrunk image.
    pub fn render_export(
        &self,
        base: &BaseImage,
        strokes: &[Stroke],
        background: Option<StrokeColor>,
        in_progress: Option<&Stroke>,
    ) -> Result<RgbaImage> {
        base.validate()?;
        let img = base.rgba();
        let layout = geometry::export_layout(img.width(), img.height());
        log::debug!(
            "Export layout for {}x{}: scale {:.4}, canvas {}x{}",
            img.width(),
            img.height(),
            layout.scale,
            layout.canvas_width,
            layout.canvas_height
        );

        let fill = background
            .filter(|c| !c.is_transparent())
            .unwrap_or(StrokeColor::WHITE);
        let mut canvas = RgbaImage::from_pixel(
            layout.canvas_width,
            layout.canvas_height,
            Rgba(fill.to_rgba_u8()),
        );

        let offset = layout.offset as i64;
        if layout.scale < 1.0 {
            let scaled = imageops::resize(
                img,
                layout.scaled_width,
                layout.scaled_height,
                imageops::FilterType::Lanczos3,
            );
            imageops::overlay(&mut canvas, &scaled, offset, offset);
        } else {
            imageops::overlay(&mut canvas, img, offset, offset);
        }

        let mapped: Vec<Stroke> = strokes
            .iter()
            .chain(in_progress)
            .map(|s| s.transformed(layout.scale, layout.offset as f32))
            .collect();
        self.draw_strokes(&mut canvas, &mapped)?;
        Ok(canvas)
    }

    fn draw_strokes<'a>(
        &self,
        canvas: &mut RgbaImage,
        strokes: impl IntoIterator<Item = &'a Stroke>,
    ) -> Result<()> {
        let mut strokes = strokes.into_iter().peekable();
        if strokes.peek().is_none() {
            return Ok(());
        }
        with_overlay(canvas, |pixmap| {
            for stroke in strokes {
                self.draw_stroke(pixmap, stroke);
            }
        })
    }

    /// Rasterize one stroke. Malformed strokes are logged and skipped so
    /// the rest of the composite still renders.
    fn draw_stroke(&self, pixmap: &mut Pixmap, stroke: &Stroke) {
        let tool = stroke.tool();
        if stroke.points().len() < tool.min_points() {
            log::warn!(
                "Skipping {} stroke with {} points (needs {})",
                tool.name(),
                stroke.points().len(),
                tool.min_points()
            );
            return;
        }
        let width = stroke.line_width();
        if !width.is_finite() || width < 0.0 {
            log::warn!("Skipping {} stroke with line width {}", tool.name(), width);
            return;
        }

        let drawn = match tool {
            Tool::Pen | Tool::Highlighter => draw_polyline(pixmap, stroke),
            Tool::Arrow => draw_arrow(pixmap, stroke),
            Tool::Rectangle => draw_rectangle(pixmap, stroke),
            Tool::Ellipse => draw_ellipse(pixmap, stroke),
            Tool::Text => self.draw_caption(pixmap, stroke),
        };
        if !drawn {
            log::warn!("Skipping degenerate {} stroke", tool.name());
        }
    }

    fn draw_caption(&self, pixmap: &mut Pixmap, stroke: &Stroke) -> bool {
        let (Some(caption_text), Some(origin)) = (stroke.text(), stroke.points().first()) else {
            return false;
        };
        let Some(font) = &self.font else {
            log::warn!("No caption font loaded, skipping text {:?}", caption_text);
            return true;
        };
        text::draw_text(
            pixmap,
            font,
            caption_text,
            *origin,
            caption::font_size(stroke.line_width()),
            render_color(stroke).to_rgba_u8(),
        );
        true
    }
}

/// Color a stroke is actually painted with.
///
/// The highlighter always paints at half opacity; the stored color is
/// left untouched.
pub fn render_color(stroke: &Stroke) -> StrokeColor {
    match stroke.tool() {
        Tool::Highlighter => stroke.color().with_alpha(geometry::HIGHLIGHTER_ALPHA),
        _ => stroke.color(),
    }
}

/// Rasterize onto a transparent overlay the size of `img`, then blend it in
fn with_overlay(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) -> Result<()> {
    let (w, h) = (img.width(), img.height());
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| Error::InvalidImage(format!("cannot allocate {w}x{h} overlay")))?;

    f(&mut pixmap);

    blend_overlay(img, &pixmap);
    Ok(())
}

/// Source-over blend a premultiplied overlay onto straight-alpha pixels.
///
/// Channels are rounded, not truncated, so opaque canvas pixels stay at
/// alpha 255 under translucent strokes.
fn blend_overlay(img: &mut RgbaImage, overlay: &Pixmap) {
    for (dst, src) in img.pixels_mut().zip(overlay.pixels()) {
        let src_a = src.alpha();
        if src_a == 0 {
            continue;
        }
        let c = src.demultiply();
        if src_a == u8::MAX {
            *dst = Rgba([c.red(), c.green(), c.blue(), u8::MAX]);
            continue;
        }

        let sa = src_a as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(c.red(), dst[0]),
            mix(c.green(), dst[1]),
            mix(c.blue(), dst[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }
}

fn paint_for(color: StrokeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn line_style(width: f32, line_cap: LineCap) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width,
        line_cap,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Pen and highlighter: polyline through every point with round caps and joins
fn draw_polyline(pixmap: &mut Pixmap, stroke: &Stroke) -> bool {
    let points = stroke.points();
    let paint = paint_for(render_color(stroke));
    let first = points[0];

    if points.iter().all(|p| *p == first) {
        // A tap with no movement leaves a round dot
        let Some(dot) = PathBuilder::from_circle(first.x, first.y, stroke.line_width() / 2.0) else {
            return false;
        };
        pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        return true;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in &points[1..] {
        pb.line_to(p.x, p.y);
    }
    let Some(path) = pb.finish() else {
        return false;
    };
    pixmap.stroke_path(
        &path,
        &paint,
        &line_style(stroke.line_width(), LineCap::Round),
        Transform::identity(),
        None,
    );
    true
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(start: Point, end: Point, line_width: f32) -> Option<tiny_skia::Path> {
    let [head1, head2] = arrow::head_points(start, end, line_width);

    let mut pb = PathBuilder::new();

    // Shaft line from start to end
    pb.move_to(start.x, start.y);
    pb.line_to(end.x, end.y);

    // First head line
    pb.move_to(end.x, end.y);
    pb.line_to(head1.x, head1.y);

    // Second head line
    pb.move_to(end.x, end.y);
    pb.line_to(head2.x, head2.y);

    pb.finish()
}

fn draw_arrow(pixmap: &mut Pixmap, stroke: &Stroke) -> bool {
    let Some((start, end)) = stroke.endpoints() else {
        return false;
    };
    let Some(path) = build_arrow_path(start, end, stroke.line_width()) else {
        return false;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(render_color(stroke)),
        &line_style(stroke.line_width(), LineCap::Round),
        Transform::identity(),
        None,
    );
    true
}

fn draw_rectangle(pixmap: &mut Pixmap, stroke: &Stroke) -> bool {
    let Some((a, b)) = stroke.endpoints() else {
        return false;
    };
    let bounds = Bounds::from_corners(a, b);

    let mut pb = PathBuilder::new();
    pb.move_to(bounds.min_x, bounds.min_y);
    pb.line_to(bounds.max_x, bounds.min_y);
    pb.line_to(bounds.max_x, bounds.max_y);
    pb.line_to(bounds.min_x, bounds.max_y);
    pb.close();
    let Some(path) = pb.finish() else {
        return false;
    };

    pixmap.stroke_path(
        &path,
        &paint_for(render_color(stroke)),
        &line_style(stroke.line_width(), LineCap::Butt),
        Transform::identity(),
        None,
    );
    true
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

fn draw_ellipse(pixmap: &mut Pixmap, stroke: &Stroke) -> bool {
    let Some((a, b)) = stroke.endpoints() else {
        return false;
    };
    let (cx, cy, rx, ry) = Bounds::from_corners(a, b).ellipse();
    if rx <= 0.0 && ry <= 0.0 {
        return false;
    }
    let Some(path) = build_ellipse_path(cx, cy, rx, ry) else {
        return false;
    };

    pixmap.stroke_path(
        &path,
        &paint_for(render_color(stroke)),
        &line_style(stroke.line_width(), LineCap::Butt),
        Transform::identity(),
        None,
    );
    true
}
