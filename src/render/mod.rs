//! Stroke rendering module
//!
//! This module contains:
//! - Geometry calculations shared by every rasterization routine
//! - The compositor that flattens base image + strokes using tiny-skia
//! - Caption rasterization using fontdue

pub mod geometry;
pub mod image;
pub mod text;

pub use geometry::{ExportLayout, export_layout};
pub use image::{Compositor, render_color};
