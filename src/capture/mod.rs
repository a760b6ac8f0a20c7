//! Frame acquisition boundary
//!
//! This module contains:
//! - The base image type every render starts from (image.rs)
//! - The frame source interface the host's capture backend implements
//! - A still-image frame source backed by a file or an in-memory image

pub mod image;

use std::path::Path;

use crate::domain::Rect;
use crate::error::Result;
use self::image::BaseImage;

/// Something that can produce screenshots.
///
/// A `None` return is a failed capture; it is surfaced to the caller and
/// never retried here.
pub trait FrameSource {
    fn capture_full_screen(&self) -> Option<BaseImage>;
    fn capture_window(&self) -> Option<BaseImage>;
    fn capture_region(&self, rect: Rect) -> Option<BaseImage>;
}

/// Frame source that always "captures" the same still image
#[derive(Clone, Debug)]
pub struct StillFrameSource {
    frame: BaseImage,
}

impl StillFrameSource {
    pub fn new(frame: BaseImage) -> Self {
        Self { frame }
    }

    /// Load the still frame from an image file
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BaseImage::open(path)?))
    }

    fn bounds(&self) -> Rect {
        Rect::from_xywh(0, 0, self.frame.width(), self.frame.height())
    }
}

impl FrameSource for StillFrameSource {
    fn capture_full_screen(&self) -> Option<BaseImage> {
        Some(self.frame.clone())
    }

    /// A still frame has no window list; fall back to the full frame
    fn capture_window(&self) -> Option<BaseImage> {
        log::debug!("No window to capture, using the full frame");
        self.capture_full_screen()
    }

    fn capture_region(&self, rect: Rect) -> Option<BaseImage> {
        let Some(region) = self.bounds().intersect(rect) else {
            log::warn!("Capture region {:?} lies outside the frame", rect);
            return None;
        };
        let cropped = ::image::imageops::crop_imm(
            self.frame.rgba(),
            region.left as u32,
            region.top as u32,
            region.width() as u32,
            region.height() as u32,
        )
        .to_image();
        Some(BaseImage::from_rgba(cropped))
    }
}
