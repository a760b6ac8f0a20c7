//! Screenshot annotation engine
//!
//! Holds a base image, records strokes drawn over it on an undo/redo
//! timeline, and flattens the result into a bitmap for display, saving or
//! export.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod render;
pub mod session;

pub use annotations::handle_draw_msg;
pub use capture::{FrameSource, StillFrameSource, image::BaseImage};
pub use config::{EditorConfig, SaveLocation, StrokeColor};
pub use domain::{Point, Rect, Stroke, Tool};
pub use error::{Error, Result};
pub use export::{ExportFormat, FileEncoder, ImageEncoder};
pub use render::Compositor;
pub use session::{DrawMsg, EditorSession, Gesture, Timeline};
