//! Pure domain types with minimal dependencies
//!
//! This module contains the stroke model and geometry shared by the
//! timeline, the gesture handlers and the compositor.

pub mod geometry;
pub mod stroke;

pub use geometry::*;
pub use stroke::*;
