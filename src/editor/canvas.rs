//! Drawing surface the regions paint into
//!
//! Coordinates are pixels relative to the top-left corner of the control.

use egui::Color32;

pub trait Canvas {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32);

    fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32);

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Color32);

    /// Draw a single line of text with its top-left corner at `(x, y)`
    fn text(&mut self, x: i32, y: i32, text: &str, colour: Color32, strong: bool);
}

#[cfg(test)]
pub(crate) use recording::RecordingCanvas;

#[cfg(test)]
mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawOp {
        Fill { x: i32, y: i32, w: i32, h: i32, colour: Color32 },
        Outline { x: i32, y: i32, w: i32, h: i32, colour: Color32 },
        Line { x1: i32, y1: i32, x2: i32, y2: i32, colour: Color32 },
        Text { x: i32, y: i32, text: String, colour: Color32, strong: bool },
    }

    /// Canvas that remembers every call, for layout and drawing tests
    #[derive(Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<DrawOp>,
    }

    impl RecordingCanvas {
        /// Text runs drawn at the given y, ordered by x
        pub fn texts_at_y(&self, y: i32) -> Vec<(i32, String)> {
            let mut texts: Vec<_> = self
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { x, y: ty, text, .. } if *ty == y => Some((*x, text.clone())),
                    _ => None,
                })
                .collect();
            texts.sort_by_key(|(x, _)| *x);
            texts
        }

        /// Distinct y positions that received text
        pub fn text_rows(&self) -> Vec<i32> {
            let mut rows: Vec<i32> = self
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { y, .. } => Some(*y),
                    _ => None,
                })
                .collect();
            rows.sort_unstable();
            rows.dedup();
            rows
        }

        pub fn fills_with(&self, colour: Color32) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Fill { colour: c, .. } if *c == colour))
                .count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32) {
            self.ops.push(DrawOp::Fill { x, y, w, h, colour });
        }

        fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32) {
            self.ops.push(DrawOp::Outline { x, y, w, h, colour });
        }

        fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Color32) {
            self.ops.push(DrawOp::Line { x1, y1, x2, y2, colour });
        }

        fn text(&mut self, x: i32, y: i32, text: &str, colour: Color32, strong: bool) {
            self.ops.push(DrawOp::Text {
                x,
                y,
                text: text.to_string(),
                colour,
                strong,
            });
        }
    }
}
