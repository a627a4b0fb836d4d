//! Region traits: the vertically stacked units a document view is built from

use super::canvas::Canvas;
use super::layout::{DrawCtx, LayoutCtx};
use super::palette::ColourIndex;
use crate::document::{CursorState, Document};

/// Bounding box of a cell; `x`/`w` are pixels, `y`/`h` are lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i64,
    pub w: i32,
    pub h: i64,
}

impl Rect {
    pub const UNDEFINED: Rect = Rect {
        x: -1,
        y: -1,
        w: -1,
        h: -1,
    };

    pub fn is_defined(&self) -> bool {
        *self != Rect::UNDEFINED
    }

    /// Whether the pixel column `x` and line `y` fall inside this box
    pub fn contains(&self, x: i32, y: i64) -> bool {
        self.is_defined() && x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Which sub-column of a region a point or offset belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScreenArea {
    #[default]
    None,
    Offset,
    Hex,
    Ascii,
    Special,
}

/// Result of a region's cursor navigation primitive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorMove {
    To(u64),
    /// Continue at the end of the previous data region
    PrevRegion,
    /// Continue at the start of the next data region
    NextRegion,
}

/// Mouse pointer shape to show over a point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerHint {
    #[default]
    Default,
    Text,
    Hand,
}

/// Layout state every region carries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionBase {
    /// First line of the region
    pub y_offset: i64,
    /// Height in lines, set by `calc_height`
    pub y_lines: i64,

    pub indent_depth: i32,
    /// Number of indentation levels closed at the bottom of this region
    pub indent_final: i32,

    /// Byte range an indentation opened by this region covers
    pub indent_offset: u64,
    pub indent_length: u64,
}

impl RegionBase {
    pub fn new(indent_offset: u64, indent_length: u64) -> Self {
        Self {
            indent_offset,
            indent_length,
            ..Self::default()
        }
    }

    pub fn y_end(&self) -> i64 {
        self.y_offset + self.y_lines
    }
}

/// Cursor, mode and selection handed to region input hooks
#[derive(Clone, Copy, Debug)]
pub struct EditCtx {
    pub cursor_pos: u64,
    pub cursor_state: CursorState,
    pub insert_mode: bool,
    pub selection_off: u64,
    pub selection_length: u64,
}

pub trait Region {
    fn base(&self) -> &RegionBase;

    fn base_mut(&mut self) -> &mut RegionBase;

    /// Minimum width this region needs to be drawn without clipping
    fn calc_width(&self, _layout: &LayoutCtx) -> i32 {
        0
    }

    /// Recompute `y_lines` and any cached column positions
    fn calc_height(&mut self, layout: &LayoutCtx);

    /// Paint the region with its top-left corner at pixel `(x, y)`
    ///
    /// `y` is negative when the region starts above the visible area. Only
    /// lines inside the client area are drawn.
    fn draw(&self, ctx: &DrawCtx, canvas: &mut dyn Canvas, x: i32, y: i64);

    /// Pointer shape over a point; `x` is virtual pixels, `y_lines` is relative to the region
    fn cursor_for_point(&self, _layout: &LayoutCtx, _x: i32, _y_lines: i64, _y_px: i32) -> PointerHint {
        PointerHint::Default
    }

    fn as_data_region(&self) -> Option<&dyn GenericDataRegion> {
        None
    }

    fn as_data_region_mut(&mut self) -> Option<&mut dyn GenericDataRegion> {
        None
    }

    /// Range of the annotation this region displays, if any
    fn comment_range(&self) -> Option<(u64, u64)> {
        None
    }
}

/// A region backed by the bytes `[d_offset, d_offset + d_length)`
pub trait GenericDataRegion: Region {
    fn d_offset(&self) -> u64;

    fn d_length(&self) -> u64;

    fn d_end(&self) -> u64 {
        self.d_offset() + self.d_length()
    }

    /// Exact hit test of a point; `None` outside of any byte cell
    fn offset_at_xy(&self, layout: &LayoutCtx, x: i32, y_lines: i64) -> Option<(u64, ScreenArea)>;

    /// Byte nearest to a point, preferring the column named by `hint`
    fn offset_near_xy(
        &self,
        layout: &LayoutCtx,
        x: i32,
        y_lines: i64,
        hint: ScreenArea,
    ) -> Option<(u64, ScreenArea)>;

    fn cursor_left_from(&self, pos: u64) -> CursorMove;
    fn cursor_right_from(&self, pos: u64) -> CursorMove;
    fn cursor_up_from(&self, pos: u64) -> CursorMove;
    fn cursor_down_from(&self, pos: u64) -> CursorMove;
    fn cursor_home_from(&self, pos: u64) -> u64;
    fn cursor_end_from(&self, pos: u64) -> u64;

    /// Visual column of `pos` within its line
    fn cursor_column(&self, pos: u64) -> u32;

    fn first_row_nearest_column(&self, column: u32) -> u64;
    fn last_row_nearest_column(&self, column: u32) -> u64;
    fn nth_row_nearest_column(&self, row: i64, column: u32) -> u64;

    /// Number of lines showing bytes, excluding closing indentation lines
    fn data_lines(&self) -> i64 {
        self.base().y_lines - self.base().indent_final as i64
    }

    /// Bounds of a byte's hex cell, or its ASCII cell when `area` is `Ascii`
    ///
    /// `y` is an absolute line. Returns `Rect::UNDEFINED` for offsets this
    /// region cannot show.
    fn calc_offset_bounds(&self, layout: &LayoutCtx, offset: u64, area: ScreenArea) -> Rect;

    /// Handle a typed character before the default editing does
    ///
    /// Must leave everything untouched when returning `false`.
    fn on_char(&mut self, _doc: &mut dyn Document, _ctx: &EditCtx, _ch: char) -> bool {
        false
    }

    /// Serialize a selection lying wholly inside this region
    fn on_copy(&self, _doc: &dyn Document, _ctx: &EditCtx) -> Option<String> {
        None
    }

    fn on_paste(&mut self, _doc: &mut dyn Document, _ctx: &EditCtx, _text: &str) -> bool {
        false
    }
}

/// Draw the indentation brackets surrounding a region
///
/// Each enclosing level gets a vertical guide on both sides; each level
/// closed by this region gets a horizontal line through its closing line.
pub fn draw_container(ctx: &DrawCtx, canvas: &mut dyn Canvas, x: i32, y: i64, base: &RegionBase) {
    if base.indent_depth <= 0 {
        return;
    }

    let layout = ctx.layout;
    let cw = layout.char_width();
    let ch = layout.char_height() as i64;
    let colour = ctx.palette.get(ColourIndex::IndentGuide);

    let clip_top = 0i64;
    let clip_bottom = layout.client_height as i64;
    let region_bottom = y + base.y_lines * ch;
    if region_bottom <= clip_top || y >= clip_bottom {
        return;
    }

    let first_closing = base.indent_depth - base.indent_final.min(base.indent_depth);

    for level in 0..base.indent_depth {
        let left = x + layout.indent_width(level) + cw / 2;
        let right = x + layout.virtual_width - layout.indent_width(level) - cw / 2 - 1;

        // Levels closed here end in the middle of their closing line, innermost first
        let bottom = if level >= first_closing {
            let closing_line =
                base.y_lines - base.indent_final as i64 + (base.indent_depth - 1 - level) as i64;
            y + closing_line * ch + ch / 2
        } else {
            region_bottom
        };

        let top = y.max(clip_top) as i32;
        let bottom_px = bottom.min(clip_bottom) as i32;
        if bottom_px > top {
            canvas.line(left, top, left, bottom_px, colour);
            canvas.line(right, top, right, bottom_px, colour);
        }

        if level >= first_closing && bottom >= clip_top && bottom < clip_bottom {
            canvas.line(left, bottom as i32, right, bottom as i32, colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_undefined() {
        assert!(!Rect::UNDEFINED.is_defined());
        assert!(!Rect::UNDEFINED.contains(-1, -1));

        let rect = Rect {
            x: 10,
            y: 3,
            w: 16,
            h: 1,
        };
        assert!(rect.contains(10, 3));
        assert!(rect.contains(25, 3));
        assert!(!rect.contains(26, 3));
        assert!(!rect.contains(10, 4));
    }
}
