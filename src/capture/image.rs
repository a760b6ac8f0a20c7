//! Base image type for captured screenshots

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{Error, Result};

/// A captured screenshot, or the result of an earlier edit, being annotated.
///
/// Cheap to clone; the pixels are shared and never mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseImage {
    rgba: Arc<RgbaImage>,
}

impl BaseImage {
    /// Wrap already-decoded RGBA pixels
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        log::debug!(
            "BaseImage created: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        Self {
            rgba: Arc::new(rgba),
        }
    }

    /// Build from a raw RGBA8 buffer, rejecting buffers that do not match
    /// the dimensions
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let rgba = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            Error::InvalidImage(format!("buffer too small for {width}x{height} RGBA image"))
        })?;
        Ok(Self::from_rgba(rgba))
    }

    /// Decode an encoded image (PNG, JPEG, ...)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| Error::InvalidImage(e.to_string()))?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Read and decode an image file
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|e| Error::InvalidImage(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Fail unless the image has pixels to composite onto
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.rgba.dimensions();
        if w == 0 || h == 0 {
            return Err(Error::InvalidImage(format!("image has no pixels ({w}x{h})")));
        }
        if self.rgba.as_raw().len() < (w as usize) * (h as usize) * 4 {
            return Err(Error::InvalidImage("pixel buffer is truncated".into()));
        }
        Ok(())
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

impl From<RgbaImage> for BaseImage {
    fn from(rgba: RgbaImage) -> Self {
        Self::from_rgba(rgba)
    }
}
