//! Message handlers for drawing and timeline control
//!
//! This module provides `handle_draw_msg`, the single entry point through
//! which the host UI drives an editing session.

pub mod handlers;

pub use handlers::handle_draw_msg;
