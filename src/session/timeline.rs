//! Linear undo/redo history of committed strokes

use crate::domain::Stroke;

/// Ordered stroke history for one editing session.
///
/// Every stroke lives in exactly one of `committed` (rendered, oldest
/// first) or `undone` (eligible for redo, most recently removed last).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    committed: Vec<Stroke>,
    undone: Vec<Stroke>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new stroke. Any redo history is dropped.
    pub fn commit(&mut self, stroke: Stroke) {
        self.committed.push(stroke);
        self.undone.clear();
    }

    /// Move the newest committed stroke to the redo stack
    pub fn undo(&mut self) -> bool {
        match self.committed.pop() {
            Some(stroke) => {
                self.undone.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Restore the most recently undone stroke
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(stroke) => {
                self.committed.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Move every committed stroke to the redo stack, keeping their order.
    /// [`Timeline::redo`] then restores them one at a time, newest first.
    pub fn clear_all(&mut self) -> bool {
        if self.committed.is_empty() {
            return false;
        }
        self.undone.extend(self.committed.drain(..));
        true
    }

    /// Strokes to render, in commit order
    pub fn current_strokes(&self) -> &[Stroke] {
        &self.committed
    }

    /// Owned copy of the committed strokes, for handing to a background export
    pub fn snapshot(&self) -> Vec<Stroke> {
        self.committed.clone()
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn undone_len(&self) -> usize {
        self.undone.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrokeColor;
    use crate::domain::{Point, Tool};

    fn stroke(n: f32) -> Stroke {
        Stroke::new(
            Tool::Pen,
            vec![Point::new(n, n)],
            StrokeColor::default(),
            3.0,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_undo_redo_on_empty() {
        let mut t = Timeline::new();
        assert!(!t.undo());
        assert!(!t.redo());
        assert!(!t.clear_all());
        assert!(!t.can_undo());
        assert!(!t.can_redo());
    }

    #[test]
    fn test_undo_then_redo_restores_order() {
        let mut t = Timeline::new();
        for i in 0..4 {
            t.commit(stroke(i as f32));
        }
        let before = t.snapshot();
        assert!(t.undo());
        assert_eq!(t.len(), 3);
        assert!(t.can_redo());
        assert!(t.redo());
        assert_eq!(t.current_strokes(), before.as_slice());
        assert!(!t.can_redo());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut t = Timeline::new();
        t.commit(stroke(1.0));
        t.commit(stroke(2.0));
        t.undo();
        t.undo();
        t.commit(stroke(3.0));
        assert!(!t.redo());
        assert_eq!(t.current_strokes(), &[stroke(3.0)]);
        assert_eq!(t.undone_len(), 0);
    }

    #[test]
    fn test_clear_all_redo_one_at_a_time() {
        let mut t = Timeline::new();
        let strokes: Vec<_> = (0..3).map(|i| stroke(i as f32)).collect();
        for s in &strokes {
            t.commit(s.clone());
        }
        assert!(t.clear_all());
        assert!(t.is_empty());
        assert_eq!(t.undone_len(), 3);

        // Newest stroke comes back first
        assert!(t.redo());
        assert_eq!(t.current_strokes(), &[strokes[2].clone()]);
        assert!(t.redo());
        assert_eq!(t.current_strokes(), &[strokes[2].clone(), strokes[1].clone()]);
        assert!(t.redo());
        assert_eq!(t.current_strokes()[2], strokes[0]);
        assert!(!t.redo());
    }

    #[test]
    fn test_clear_all_keeps_commit_order_on_redo_stack() {
        let mut t = Timeline::new();
        for i in 0..5 {
            t.commit(stroke(i as f32));
        }
        let before = t.snapshot();
        t.clear_all();
        assert_eq!(t.undone, before);
        assert!(t.committed.is_empty());

        // A later commit still drops everything that was cleared
        t.commit(stroke(9.0));
        assert_eq!(t.undone_len(), 0);
    }

    #[test]
    fn test_conservation_over_mixed_operations() {
        let mut t = Timeline::new();
        let mut total = 0;
        // commit, undo, redo, clear encoded as 0..4, cycled deterministically
        let ops = [0, 0, 1, 0, 2, 1, 1, 3, 2, 0, 2, 3, 2, 2, 1, 0, 0, 1, 2, 2];
        for (i, op) in ops.iter().enumerate() {
            match op {
                0 => {
                    t.commit(stroke(i as f32));
                    total = t.len();
                }
                1 => {
                    t.undo();
                }
                2 => {
                    t.redo();
                }
                _ => {
                    t.clear_all();
                }
            }
            assert_eq!(t.len() + t.undone_len(), total, "after op #{i}");
        }
    }
}
