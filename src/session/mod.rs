//! Editing session management module
//!
//! This module contains:
//! - The undo/redo timeline of committed strokes
//! - Session state (current tool, style, live gesture)
//! - Message types the host UI sends into a session

pub mod messages;
pub mod state;
pub mod timeline;

pub use messages::{DrawMsg, Gesture};
pub use state::EditorSession;
pub use timeline::Timeline;
