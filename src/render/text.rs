//! Caption rasterization using fontdue
//!
//! Glyph coverage masks are blended straight into the stroke overlay.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::domain::Point;
use crate::error::{Error, Result};

/// Fonts tried in order when no font path is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Parse a font from raw TrueType/OpenType bytes
pub fn load_font(bytes: Vec<u8>) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default()).map_err(|e| Error::InvalidFont(e.to_string()))
}

/// Read and parse a font file
pub fn load_font_file(path: &Path) -> Result<Font> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::InvalidFont(format!("{}: {}", path.display(), e)))?;
    load_font(bytes)
}

/// First well-known system font that exists on this machine
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Draw `text` with its line box's top-left corner at `origin`.
///
/// Single line, no wrapping, no background box.
pub fn draw_text(
    pixmap: &mut Pixmap,
    font: &Font,
    text: &str,
    origin: Point,
    size: f32,
    color: [u8; 4],
) {
    let ascent = font
        .horizontal_line_metrics(size)
        .map(|m| m.ascent)
        .unwrap_or(size * 0.8);
    let baseline = (origin.y + ascent).round() as i32;

    let mut pen_x = origin.x;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c.is_control() {
            continue;
        }
        if let Some(p) = prev {
            pen_x += font.horizontal_kern(p, c, size).unwrap_or(0.0);
        }
        let (metrics, coverage) = font.rasterize(c, size);
        let left = (pen_x + metrics.xmin as f32).round() as i32;
        let top = baseline - (metrics.height as i32 + metrics.ymin);
        blend_mask(pixmap, &coverage, metrics.width, left, top, color);
        pen_x += metrics.advance_width;
        prev = Some(c);
    }
}

/// Source-over blend an 8-bit coverage mask tinted with `color`
fn blend_mask(
    pixmap: &mut Pixmap,
    mask: &[u8],
    mask_width: usize,
    left: i32,
    top: i32,
    [r, g, b, a]: [u8; 4],
) {
    if mask_width == 0 {
        return;
    }
    let (w, h) = (pixmap.width() as i32, pixmap.height() as i32);
    let pixels = pixmap.pixels_mut();

    for (row, line) in mask.chunks(mask_width).enumerate() {
        let y = top + row as i32;
        if y < 0 || y >= h {
            continue;
        }
        for (col, &cov) in line.iter().enumerate() {
            let x = left + col as i32;
            if cov == 0 || x < 0 || x >= w {
                continue;
            }
            let src_a = (cov as f32 / 255.0) * (a as f32 / 255.0);
            if src_a <= 0.0 {
                continue;
            }
            let idx = (y * w + x) as usize;
            let dst = pixels[idx];
            let inv = 1.0 - src_a;
            let blend = |s: u8, d: u8| (s as f32 * src_a + d as f32 * inv).round() as u8;
            let out_a = (src_a * 255.0 + dst.alpha() as f32 * inv).round() as u8;
            let out = PremultipliedColorU8::from_rgba(
                blend(r, dst.red()).min(out_a),
                blend(g, dst.green()).min(out_a),
                blend(b, dst.blue()).min(out_a),
                out_a,
            );
            if let Some(out) = out {
                pixels[idx] = out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_font() -> Option<Font> {
        let path = find_system_font()?;
        load_font_file(&path).ok()
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = load_font(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(Error::InvalidFont(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = load_font_file(Path::new("/definitely/not/a/font.ttf"));
        assert!(matches!(result, Err(Error::InvalidFont(_))));
    }

    #[test]
    fn test_draw_text_marks_pixels_below_origin() {
        let Some(font) = test_font() else {
            // No system font available on this machine
            return;
        };
        let mut pixmap = Pixmap::new(200, 60).unwrap();
        draw_text(&mut pixmap, &font, "Hi", Point::new(10.0, 10.0), 24.0, [0, 0, 255, 255]);

        let mut touched = 0;
        for (i, px) in pixmap.pixels().iter().enumerate() {
            if px.alpha() > 0 {
                let (x, y) = (i as u32 % 200, i as u32 / 200);
                assert!(x >= 9 && y >= 10, "glyph pixel at ({x}, {y}) left of origin");
                assert_eq!(px.red(), 0);
                touched += 1;
            }
        }
        assert!(touched > 20);
    }

    #[test]
    fn test_draw_text_clips_to_pixmap() {
        let Some(font) = test_font() else {
            return;
        };
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        draw_text(
            &mut pixmap,
            &font,
            "clipped caption",
            Point::new(-30.0, 5.0),
            40.0,
            [255, 0, 0, 255],
        );
    }
}
