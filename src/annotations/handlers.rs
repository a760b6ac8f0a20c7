//! Draw message handlers
//!
//! Handles DrawMsg for every tool and the timeline controls.

use crate::domain::GestureKind;
use crate::error::{Error, Result};
use crate::session::messages::{DrawMsg, Gesture};
use crate::session::state::EditorSession;

/// Handle a DrawMsg, modifying session state.
///
/// Errors leave the session usable; a rejected stroke is simply not
/// committed.
pub fn handle_draw_msg(session: &mut EditorSession, msg: DrawMsg) -> Result<()> {
    match msg {
        DrawMsg::Gesture(gesture) => return handle_gesture(session, gesture),
        DrawMsg::SelectTool(tool) => {
            if session.tool != tool {
                session.cancel_drawing();
                session.tool = tool;
            }
        }
        DrawMsg::SetColor(color) => session.color = color,
        DrawMsg::SetLineWidth(width) => {
            session.line_width = session.config.clamp_line_width(width);
        }
        DrawMsg::SetBackground(background) => session.background = background,
        DrawMsg::SubmitText(text) => return submit_text(session, text),
        DrawMsg::CancelText => session.text_anchor = None,
        DrawMsg::Undo => {
            session.timeline.undo();
        }
        DrawMsg::Redo => {
            session.timeline.redo();
        }
        DrawMsg::ClearAll => {
            session.drawing = None;
            session.timeline.clear_all();
        }
    }
    Ok(())
}

// ============================================================================
// Gesture handlers
// ============================================================================

fn handle_gesture(session: &mut EditorSession, gesture: Gesture) -> Result<()> {
    match session.tool.gesture() {
        GestureKind::Freehand => handle_freehand(session, gesture),
        GestureKind::TwoPoint => handle_two_point(session, gesture),
        GestureKind::Caption => {
            // Captions are placed on release; text arrives via SubmitText
            if let Gesture::End(p) = gesture {
                session.text_anchor = Some(p);
            }
            Ok(())
        }
    }
}

fn handle_freehand(session: &mut EditorSession, gesture: Gesture) -> Result<()> {
    match gesture {
        Gesture::Begin(p) => session.drawing = Some(vec![p]),
        Gesture::Move(p) => {
            if let Some(points) = session.drawing.as_mut() {
                points.push(p);
            }
        }
        Gesture::End(p) => {
            if let Some(mut points) = session.drawing.take() {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                let stroke = session.make_stroke(points, None)?;
                session.timeline.commit(stroke);
            }
        }
    }
    Ok(())
}

/// Arrow, rectangle and ellipse only need the press point and the latest
/// pointer position.
fn handle_two_point(session: &mut EditorSession, gesture: Gesture) -> Result<()> {
    match gesture {
        Gesture::Begin(p) => session.drawing = Some(vec![p, p]),
        Gesture::Move(p) => {
            if let Some(points) = session.drawing.as_mut() {
                points.truncate(1);
                points.push(p);
            }
        }
        Gesture::End(p) => {
            if let Some(mut points) = session.drawing.take() {
                points.truncate(1);
                points.push(p);
                let stroke = session.make_stroke(points, None)?;
                session.timeline.commit(stroke);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Text handlers
// ============================================================================

fn submit_text(session: &mut EditorSession, text: String) -> Result<()> {
    if text.trim().is_empty() {
        // Keep the anchor so the user can try again
        return Err(Error::InvalidInput("caption text is empty".into()));
    }
    let Some(anchor) = session.text_anchor.take() else {
        return Err(Error::InvalidInput("no caption position chosen".into()));
    };
    let stroke = session.make_stroke(vec![anchor], Some(text))?;
    session.timeline.commit(stroke);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::BaseImage;
    use crate::config::StrokeColor;
    use crate::domain::{Point, Tool};
    use crate::render::Compositor;
    use image::{Rgba, RgbaImage};

    fn session_with(tool: Tool) -> EditorSession {
        let mut session = EditorSession::default();
        handle_draw_msg(&mut session, DrawMsg::SelectTool(tool)).unwrap();
        session
    }

    fn drag(session: &mut EditorSession, points: &[(f32, f32)]) {
        let (first, rest) = points.split_first().unwrap();
        handle_draw_msg(session, DrawMsg::begin(first.0, first.1)).unwrap();
        for &(x, y) in &rest[..rest.len().saturating_sub(1)] {
            handle_draw_msg(session, DrawMsg::move_to(x, y)).unwrap();
        }
        let last = points.last().unwrap();
        handle_draw_msg(session, DrawMsg::end(last.0, last.1)).unwrap();
    }

    #[test]
    fn test_pen_records_every_point() {
        let mut session = session_with(Tool::Pen);
        drag(&mut session, &[(1.0, 1.0), (2.0, 3.0), (4.0, 4.0), (6.0, 2.0)]);
        assert_eq!(session.timeline.len(), 1);
        let stroke = &session.timeline.current_strokes()[0];
        assert_eq!(stroke.tool(), Tool::Pen);
        assert_eq!(stroke.points().len(), 4);
        assert!(session.drawing.is_none());
    }

    #[test]
    fn test_pen_click_commits_single_point() {
        let mut session = session_with(Tool::Pen);
        drag(&mut session, &[(5.0, 5.0), (5.0, 5.0)]);
        assert_eq!(session.timeline.current_strokes()[0].points(), &[Point::new(5.0, 5.0)]);
    }

    #[test]
    fn test_two_point_tools_keep_endpoints() {
        for tool in [Tool::Arrow, Tool::Rectangle, Tool::Ellipse] {
            let mut session = session_with(tool);
            drag(&mut session, &[(0.0, 0.0), (3.0, 3.0), (8.0, 1.0), (10.0, 10.0)]);
            let stroke = &session.timeline.current_strokes()[0];
            assert_eq!(stroke.tool(), tool);
            assert_eq!(stroke.points(), &[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        }
    }

    #[test]
    fn test_stroke_uses_current_style() {
        let mut session = session_with(Tool::Highlighter);
        let blue = StrokeColor::new(0.0, 0.0, 1.0, 1.0);
        handle_draw_msg(&mut session, DrawMsg::SetColor(blue)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(12.0)).unwrap();
        drag(&mut session, &[(0.0, 0.0), (9.0, 9.0)]);
        let stroke = &session.timeline.current_strokes()[0];
        assert_eq!(stroke.color(), blue);
        assert_eq!(stroke.line_width(), 12.0);
    }

    #[test]
    fn test_line_width_is_clamped() {
        let mut session = EditorSession::default();
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(500.0)).unwrap();
        assert_eq!(session.line_width, 20.0);
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(0.0)).unwrap();
        assert_eq!(session.line_width, 1.0);
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(f32::NAN)).unwrap();
        assert_eq!(session.line_width, 1.0);
    }

    #[test]
    fn test_end_without_begin_is_ignored() {
        let mut session = session_with(Tool::Arrow);
        handle_draw_msg(&mut session, DrawMsg::move_to(3.0, 3.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::end(3.0, 3.0)).unwrap();
        assert!(session.timeline.is_empty());
    }

    #[test]
    fn test_switching_tool_abandons_gesture() {
        let mut session = session_with(Tool::Pen);
        handle_draw_msg(&mut session, DrawMsg::begin(0.0, 0.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::move_to(4.0, 4.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::SelectTool(Tool::Rectangle)).unwrap();
        assert!(session.drawing.is_none());
        handle_draw_msg(&mut session, DrawMsg::end(8.0, 8.0)).unwrap();
        assert!(session.timeline.is_empty());
    }

    #[test]
    fn test_text_needs_anchor_and_content() {
        let mut session = session_with(Tool::Text);
        // Press and drag do nothing for captions
        handle_draw_msg(&mut session, DrawMsg::begin(1.0, 1.0)).unwrap();
        assert!(session.drawing.is_none());
        handle_draw_msg(&mut session, DrawMsg::end(20.0, 30.0)).unwrap();
        assert_eq!(session.text_anchor, Some(Point::new(20.0, 30.0)));

        let empty = handle_draw_msg(&mut session, DrawMsg::SubmitText("  ".into()));
        assert!(matches!(empty, Err(Error::InvalidInput(_))));
        assert!(session.text_anchor.is_some());

        handle_draw_msg(&mut session, DrawMsg::SubmitText("Hello".into())).unwrap();
        let stroke = &session.timeline.current_strokes()[0];
        assert_eq!(stroke.text(), Some("Hello"));
        assert_eq!(stroke.points(), &[Point::new(20.0, 30.0)]);
        assert!(session.text_anchor.is_none());
    }

    #[test]
    fn test_submit_without_anchor_fails() {
        let mut session = session_with(Tool::Text);
        let result = handle_draw_msg(&mut session, DrawMsg::SubmitText("hi".into()));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(session.timeline.is_empty());
    }

    #[test]
    fn test_cancel_text_drops_anchor() {
        let mut session = session_with(Tool::Text);
        handle_draw_msg(&mut session, DrawMsg::end(5.0, 5.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::CancelText).unwrap();
        assert!(session.text_anchor.is_none());
    }

    #[test]
    fn test_undo_redo_clear_messages() {
        let mut session = session_with(Tool::Rectangle);
        drag(&mut session, &[(0.0, 0.0), (4.0, 4.0)]);
        drag(&mut session, &[(1.0, 1.0), (6.0, 6.0)]);
        drag(&mut session, &[(2.0, 2.0), (8.0, 8.0)]);
        let all = session.timeline.snapshot();

        handle_draw_msg(&mut session, DrawMsg::Undo).unwrap();
        assert_eq!(session.timeline.current_strokes(), &all[..2]);
        handle_draw_msg(&mut session, DrawMsg::Redo).unwrap();
        assert_eq!(session.timeline.current_strokes(), &all[..]);

        handle_draw_msg(&mut session, DrawMsg::ClearAll).unwrap();
        assert!(session.timeline.is_empty());
        handle_draw_msg(&mut session, DrawMsg::Redo).unwrap();
        assert_eq!(session.timeline.current_strokes(), &all[2..]);

        // Undo on an empty timeline is a no-op
        let mut fresh = EditorSession::default();
        handle_draw_msg(&mut fresh, DrawMsg::Undo).unwrap();
        assert!(fresh.timeline.is_empty());
    }

    #[test]
    fn test_new_stroke_discards_redo() {
        let mut session = session_with(Tool::Arrow);
        drag(&mut session, &[(0.0, 0.0), (9.0, 9.0)]);
        handle_draw_msg(&mut session, DrawMsg::Undo).unwrap();
        assert!(session.timeline.can_redo());
        drag(&mut session, &[(1.0, 1.0), (5.0, 5.0)]);
        assert!(!session.timeline.can_redo());
        assert_eq!(session.timeline.len(), 1);
    }

    #[test]
    fn test_preview_shows_live_gesture() {
        let base = BaseImage::from_rgba(RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255])));
        let compositor = Compositor::new();
        let mut session = session_with(Tool::Rectangle);
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(4.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::begin(5.0, 5.0)).unwrap();
        handle_draw_msg(&mut session, DrawMsg::move_to(30.0, 30.0)).unwrap();

        assert!(session.in_progress().is_some());
        let preview = session.preview(&compositor, &base).unwrap();
        assert_ne!(preview.get_pixel(5, 15), &Rgba([255, 255, 255, 255]));

        // Nothing committed yet, so the flattened image is untouched
        let flat = session.flatten(&compositor, &base).unwrap();
        assert_eq!(&flat, base.rgba());
    }

    #[test]
    fn test_no_live_shape_before_drag() {
        let mut session = session_with(Tool::Ellipse);
        handle_draw_msg(&mut session, DrawMsg::begin(12.0, 12.0)).unwrap();
        assert!(session.in_progress().is_none());
        handle_draw_msg(&mut session, DrawMsg::move_to(20.0, 18.0)).unwrap();
        let live = session.in_progress().unwrap();
        assert_eq!(live.points(), &[Point::new(12.0, 12.0), Point::new(20.0, 18.0)]);

        // A pen tap is already a drawable dot
        let mut pen = session_with(Tool::Pen);
        handle_draw_msg(&mut pen, DrawMsg::begin(3.0, 3.0)).unwrap();
        assert!(pen.in_progress().is_some());
    }

    #[test]
    fn test_session_survives_inverted_width_range() {
        let config: crate::config::EditorConfig =
            serde_json::from_str(r#"{"min_line_width": 30.0, "max_line_width": 5.0}"#).unwrap();
        let mut session = EditorSession::new(config);
        assert_eq!(session.line_width, 5.0);
        handle_draw_msg(&mut session, DrawMsg::SetLineWidth(12.0)).unwrap();
        assert_eq!(session.line_width, 5.0);
    }

    #[test]
    fn test_background_message() {
        let mut session = EditorSession::default();
        handle_draw_msg(&mut session, DrawMsg::SetBackground(Some(StrokeColor::WHITE))).unwrap();
        assert_eq!(session.background, Some(StrokeColor::WHITE));
        handle_draw_msg(&mut session, DrawMsg::SetBackground(None)).unwrap();
        assert_eq!(session.background, None);
    }
}
