//! egui painter and font adapters for the document control

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};

use crate::editor::{Canvas, GlyphSource};

/// Canvas drawing into an egui painter, offset by the widget's top-left corner
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    origin: Pos2,
    font: FontId,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2, font: FontId) -> Self {
        Self {
            painter,
            origin,
            font,
        }
    }

    fn pos(&self, x: i32, y: i32) -> Pos2 {
        self.origin + egui::vec2(x as f32, y as f32)
    }

    fn rect(&self, x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::from_min_size(self.pos(x, y), egui::vec2(w as f32, h as f32))
    }
}

impl Canvas for EguiCanvas<'_> {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32) {
        if w > 0 && h > 0 {
            self.painter.rect_filled(self.rect(x, y, w, h), 0.0, colour);
        }
    }

    fn outline_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Color32) {
        if w > 0 && h > 0 {
            // Half-pixel inset keeps the 1px stroke inside the rectangle
            let rect = self.rect(x, y, w, h).shrink(0.5);
            self.painter.rect_stroke(rect, 0.0, Stroke::new(1.0, colour));
        }
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Color32) {
        self.painter
            .line_segment([self.pos(x1, y1), self.pos(x2, y2)], Stroke::new(1.0, colour));
    }

    fn text(&mut self, x: i32, y: i32, text: &str, colour: Color32, strong: bool) {
        let pos = self.pos(x, y);
        self.painter
            .text(pos, Align2::LEFT_TOP, text, self.font.clone(), colour);
        if strong {
            self.painter.text(
                pos + egui::vec2(1.0, 0.0),
                Align2::LEFT_TOP,
                text,
                self.font.clone(),
                colour,
            );
        }
    }
}

/// Glyph source measured from an egui monospace font
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EguiGlyphs {
    advance: f32,
    height: f32,
}

impl EguiGlyphs {
    pub fn measure(ctx: &egui::Context, font: &FontId) -> Self {
        ctx.fonts(|fonts| Self {
            advance: fonts.glyph_width(font, '0'),
            height: fonts.row_height(font),
        })
    }
}

impl GlyphSource for EguiGlyphs {
    fn char_height(&self) -> i32 {
        self.height.ceil() as i32
    }

    fn text_width(&self, chars: usize) -> i32 {
        (self.advance * chars as f32).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_widths_round_per_run() {
        let glyphs = EguiGlyphs {
            advance: 7.5,
            height: 14.2,
        };

        assert_eq!(glyphs.char_height(), 15);
        assert_eq!(glyphs.text_width(0), 0);
        assert_eq!(glyphs.text_width(1), 8);
        assert_eq!(glyphs.text_width(2), 15);
        assert_eq!(glyphs.text_width(10), 75);
    }
}
