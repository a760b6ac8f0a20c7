//! Encoding and writing composited images
//!
//! The compositor hands back a ready bitmap; everything here runs after
//! that and may be moved off the interactive thread.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::SaveLocation;
use crate::error::{Error, Result};

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Format for a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    /// JPEG for `.jpg`/`.jpeg` destinations, PNG for anything else
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(ExportFormat::Png)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Turns a flattened bitmap into file bytes
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, img: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>>;
}

/// PNG via the png crate, JPEG via image's encoder
#[derive(Debug, Clone, Copy)]
pub struct FileEncoder {
    pub jpeg_quality: u8,
}

impl Default for FileEncoder {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl ImageEncoder for FileEncoder {
    fn encode(&self, img: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            ExportFormat::Png => write_png(&mut buffer, img)
                .map_err(|e| Error::EncodeFailure(format!("png: {e}")))?,
            ExportFormat::Jpeg => write_jpeg(&mut buffer, img, self.jpeg_quality)
                .map_err(|e| Error::EncodeFailure(format!("jpeg: {e}")))?,
        }
        Ok(buffer)
    }
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// JPEG has no alpha channel; translucent pixels are flattened onto white
fn write_jpeg<W: io::Write>(w: W, image: &RgbaImage, quality: u8) -> image::ImageResult<()> {
    let rgb = image::RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = a as u32;
        let over_white = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    });
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(w, quality.clamp(1, 100));
    encoder.encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )
}

/// Encode and write `img` to `path`, replacing any existing file atomically
pub fn write_image(
    encoder: &dyn ImageEncoder,
    img: &RgbaImage,
    format: ExportFormat,
    path: &Path,
) -> Result<()> {
    let bytes = encoder.encode(img, format)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |e: io::Error| Error::EncodeFailure(format!("{}: {}", path.display(), e));

    let mut file = tempfile::Builder::new()
        .prefix(".inkshot-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Encode and write on the blocking pool so the interactive thread stays free.
///
/// `img` must already be rendered from a snapshot of the timeline; nothing
/// here looks at live editor state.
pub async fn export_in_background(
    encoder: Arc<dyn ImageEncoder>,
    img: RgbaImage,
    format: ExportFormat,
    path: PathBuf,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        write_image(encoder.as_ref(), &img, format, &path)?;
        Ok(path)
    })
    .await
    .map_err(|e| Error::EncodeFailure(format!("export task failed: {e}")))?
}

/// Timestamped destination in the user's Pictures or Documents folder
pub fn get_export_path(location: SaveLocation, prefix: &str, format: ExportFormat) -> Option<PathBuf> {
    let mut path = match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }?;
    let name = chrono::Local::now()
        .format(&format!("{prefix}_%Y-%m-%d_%H-%M-%S.{}", format.extension()))
        .to_string();
    path.push(name);

    Some(path)
}
