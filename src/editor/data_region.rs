//! Hex/ASCII region over a byte range of the document
//!
//! ## Line layout
//!
//! ```text
//! | indent | offset gutter | hex column                  | gap | ASCII column | indent |
//!            00000000:0010   00010203 04050607 08090A0B 0C       ................
//! ```
//!
//! Every byte takes two characters in the hex column and one in the ASCII
//! column. A one character gap follows every `bytes_per_group` bytes except
//! the last byte on a line. A region that does not start on a multiple of
//! the line length is padded on its first line, so byte columns line up with
//! the neighbouring regions.

use egui::Color32;

use super::canvas::Canvas;
use super::layout::{
    DrawCtx, LayoutCtx, BYTES_PER_LINE_FIT_BYTES, BYTES_PER_LINE_FIT_GROUPS, BYTES_PER_LINE_MAX,
    BYTES_PER_LINE_MIN,
};
use super::palette::ColourIndex;
use super::region::{
    draw_container, CursorMove, EditCtx, GenericDataRegion, PointerHint, Rect, Region, RegionBase,
    ScreenArea,
};
use crate::document::{CursorState, Document};

/// Colours a byte is drawn with instead of the normal text colours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub fg: ColourIndex,
    pub bg: ColourIndex,
    pub strong: bool,
}

/// Per-kind behaviour plugged into a [`DataRegion`]
pub trait DataRegionHooks {
    fn highlight_at_off(&self, _doc: &dyn Document, _offset: u64) -> Option<Highlight> {
        None
    }

    fn on_char(&mut self, _doc: &mut dyn Document, _ctx: &EditCtx, _ch: char) -> bool {
        false
    }

    fn on_copy(&self, _doc: &dyn Document, _ctx: &EditCtx) -> Option<String> {
        None
    }

    fn on_paste(&mut self, _doc: &mut dyn Document, _ctx: &EditCtx, _text: &str) -> bool {
        false
    }
}

/// Bytes without any overlay
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainData;

impl DataRegionHooks for PlainData {}

/// Bytes coloured from the document's highlight map
#[derive(Clone, Copy, Debug, Default)]
pub struct DocHighlight;

impl DataRegionHooks for DocHighlight {
    fn highlight_at_off(&self, doc: &dyn Document, offset: u64) -> Option<Highlight> {
        doc.highlights()
            .get_innermost(offset)
            .map(|(_, colour)| Highlight {
                fg: ColourIndex::HighlightFg(colour.0),
                bg: ColourIndex::HighlightBg(colour.0),
                strong: true,
            })
    }
}

pub type DataRegionDocHighlight = DataRegion<DocHighlight>;

pub struct DataRegion<H: DataRegionHooks = PlainData> {
    base: RegionBase,
    d_offset: u64,
    d_length: u64,
    hooks: H,

    bytes_per_line_actual: u32,
    first_line_pad_bytes: u32,
    bytes_per_group: u32,

    offset_text_x: i32,
    hex_text_x: i32,
    ascii_text_x: i32,
    show_ascii: bool,
}

impl<H: DataRegionHooks + Default> DataRegion<H> {
    pub fn new(d_offset: u64, d_length: u64) -> Self {
        Self::with_hooks(d_offset, d_length, H::default())
    }
}

impl<H: DataRegionHooks> DataRegion<H> {
    pub fn with_hooks(d_offset: u64, d_length: u64, hooks: H) -> Self {
        Self {
            base: RegionBase::new(d_offset, 0),
            d_offset,
            d_length,
            hooks,
            bytes_per_line_actual: 1,
            first_line_pad_bytes: 0,
            bytes_per_group: 1,
            offset_text_x: 0,
            hex_text_x: 0,
            ascii_text_x: 0,
            show_ascii: true,
        }
    }

    pub fn bytes_per_line_actual(&self) -> u32 {
        self.bytes_per_line_actual
    }

    pub fn first_line_pad_bytes(&self) -> u32 {
        self.first_line_pad_bytes
    }

    pub fn highlight_at_off(&self, doc: &dyn Document, offset: u64) -> Option<Highlight> {
        self.hooks.highlight_at_off(doc, offset)
    }

    /// Width of the hex column for `bytes` bytes per line
    fn hex_width(layout: &LayoutCtx, bytes: u32) -> i32 {
        let bytes = bytes.max(1);
        let gaps = (bytes - 1) / layout.bytes_per_group();
        layout.string_width(2 * bytes as usize) + layout.string_width(gaps as usize)
    }

    /// Width needed to show `bytes` bytes per line at this region's depth
    pub fn calc_width_for_bytes(&self, layout: &LayoutCtx, bytes: u32) -> i32 {
        let ascii = if layout.show_ascii {
            layout.char_width() + layout.string_width(bytes as usize)
        } else {
            0
        };

        2 * layout.indent_width(self.base.indent_depth)
            + layout.offset_column_width()
            + Self::hex_width(layout, bytes)
            + ascii
    }

    fn calc_bytes_per_line(&self, layout: &LayoutCtx) -> u32 {
        let width = layout.virtual_width;

        match layout.bytes_per_line {
            BYTES_PER_LINE_FIT_BYTES => {
                let mut bytes = 1;
                while bytes < u16::MAX as u32 && self.calc_width_for_bytes(layout, bytes + 1) <= width {
                    bytes += 1;
                }
                bytes
            }
            BYTES_PER_LINE_FIT_GROUPS => {
                let group = layout.bytes_per_group();
                let mut bytes = group;
                while bytes < u16::MAX as u32
                    && self.calc_width_for_bytes(layout, bytes + group) <= width
                {
                    bytes += group;
                }
                bytes
            }
            n => n.clamp(BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX) as u32,
        }
    }

    /// Character index of a column's first hex digit within the hex column
    fn hex_char_index(&self, column: u32) -> usize {
        let bpl = self.bytes_per_line_actual;
        let gaps = column.min(bpl - 1) / self.bytes_per_group;
        (2 * column + gaps) as usize
    }

    /// Line and column a cursor at `offset` is drawn in
    ///
    /// The end of the region on a full last line is drawn one column past
    /// the last byte rather than on a new line.
    fn visual_pos(&self, offset: u64) -> (i64, u32) {
        let bpl = self.bytes_per_line_actual as u64;
        let rel = offset - self.d_offset + self.first_line_pad_bytes as u64;
        let (row, col) = ((rel / bpl) as i64, (rel % bpl) as u32);

        if offset == self.d_end() && col == 0 && row > 0 {
            (row - 1, self.bytes_per_line_actual)
        } else {
            (row, col)
        }
    }

    /// Offset of the byte at a line/column, if one is shown there
    fn offset_at_cell(&self, row: i64, col: u32) -> Option<u64> {
        if row < 0 || col >= self.bytes_per_line_actual {
            return None;
        }

        let rel = row as u64 * self.bytes_per_line_actual as u64 + col as u64;
        let pad = self.first_line_pad_bytes as u64;
        if rel < pad || rel - pad >= self.d_length {
            return None;
        }

        Some(self.d_offset + rel - pad)
    }

    fn row_of(&self, pos: u64) -> i64 {
        self.visual_pos(pos.clamp(self.d_offset, self.d_end())).0
    }

    fn hex_column_end(&self, layout: &LayoutCtx) -> i32 {
        self.hex_text_x + Self::hex_width(layout, self.bytes_per_line_actual)
    }

    /// Hex column byte under `dx` pixels into the hex column
    ///
    /// Returns `Err(col)` with the byte to the left when `dx` is in a group gap.
    fn hex_column_at(&self, layout: &LayoutCtx, dx: i32) -> Option<Result<u32, u32>> {
        let idx = layout.metrics.char_at_x(dx)? as u32;
        let stride = 2 * self.bytes_per_group + 1;
        let groups_before = idx / stride;

        if (idx + 1) % stride == 0 {
            Some(Err((idx - groups_before - 1) / 2))
        } else {
            Some(Ok((idx - groups_before) / 2))
        }
    }

    fn cell_style(&self, ctx: &DrawCtx, offset: u64, matched: bool) -> CellStyle {
        let palette = ctx.palette;

        if ctx.is_selected(offset) {
            CellStyle {
                fg: palette.get(ColourIndex::SelectedTextFg),
                bg: Some(palette.get(ColourIndex::SelectedTextBg)),
                strong: false,
            }
        } else if matched {
            CellStyle {
                fg: palette.get(ColourIndex::SecondarySelectedTextFg),
                bg: Some(palette.get(ColourIndex::SecondarySelectedTextBg)),
                strong: false,
            }
        } else if let Some(highlight) = self.highlight_at_off(ctx.doc, offset) {
            CellStyle {
                fg: palette.get(highlight.fg),
                bg: Some(palette.get(highlight.bg)),
                strong: highlight.strong,
            }
        } else {
            CellStyle {
                fg: palette.get(ColourIndex::NormalTextFg),
                bg: None,
                strong: false,
            }
        }
    }

    fn draw_cursor(&self, ctx: &DrawCtx, canvas: &mut dyn Canvas, x: i32, line_y: i32, byte: Option<u8>) {
        let layout = ctx.layout;
        let ch = layout.char_height();
        let palette = ctx.palette;
        let cursor = ctx.cursor;
        let (_, col) = self.visual_pos(cursor.pos);

        let idx = self.hex_char_index(col);
        let in_ascii = cursor.state == CursorState::Ascii && self.show_ascii;

        // Active column
        let (cell_x, cell_w, glyph) = if in_ascii {
            let cx = x + self.ascii_text_x + layout.string_width(col as usize);
            let cw = layout.string_width(col as usize + 1) - layout.string_width(col as usize);
            (cx, cw, byte.map(ascii_char))
        } else {
            let nibble = if cursor.state == CursorState::HexMid { 1 } else { 0 };
            let cx = x + self.hex_text_x + layout.string_width(idx + nibble);
            let cw = layout.string_width(idx + nibble + 1) - layout.string_width(idx + nibble);
            let digit = byte.map(|b| {
                let value = if nibble == 0 { b >> 4 } else { b & 0x0F };
                char::from_digit(value as u32, 16).unwrap_or('?').to_ascii_uppercase()
            });
            (cx, cw, digit)
        };

        if cursor.insert {
            canvas.line(cell_x, line_y, cell_x, line_y + ch, palette.get(ColourIndex::NormalTextFg));
        } else {
            canvas.fill_rect(cell_x, line_y, cell_w, ch, palette.get(ColourIndex::InvertTextBg));
            if let Some(glyph) = glyph {
                let mut buf = [0u8; 4];
                canvas.text(
                    cell_x,
                    line_y,
                    glyph.encode_utf8(&mut buf),
                    palette.get(ColourIndex::InvertTextFg),
                    false,
                );
            }
        }

        // Inactive column gets an outline of the same byte
        if self.show_ascii {
            let (ox, ow) = if in_ascii {
                let ox = x + self.hex_text_x + layout.string_width(idx);
                (ox, layout.string_width(idx + 2) - layout.string_width(idx))
            } else {
                let ox = x + self.ascii_text_x + layout.string_width(col as usize);
                (ox, layout.string_width(col as usize + 1) - layout.string_width(col as usize))
            };
            canvas.outline_rect(ox, line_y, ow, ch, palette.get(ColourIndex::NormalTextFg));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CellStyle {
    fg: Color32,
    bg: Option<Color32>,
    strong: bool,
}

fn ascii_char(byte: u8) -> char {
    if (0x20..=0x7E).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

/// Mark every byte of `window` that is part of an occurrence of `needle`
pub fn match_mask(window: &[u8], needle: &[u8]) -> Vec<bool> {
    let mut mask = vec![false; window.len()];
    if needle.is_empty() || needle.len() > window.len() {
        return mask;
    }

    for start in 0..=(window.len() - needle.len()) {
        if &window[start..start + needle.len()] == needle {
            mask[start..start + needle.len()].iter_mut().for_each(|m| *m = true);
        }
    }

    mask
}

impl<H: DataRegionHooks> Region for DataRegion<H> {
    fn base(&self) -> &RegionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RegionBase {
        &mut self.base
    }

    fn calc_width(&self, layout: &LayoutCtx) -> i32 {
        let bytes = match layout.bytes_per_line {
            BYTES_PER_LINE_FIT_BYTES => 1,
            BYTES_PER_LINE_FIT_GROUPS => layout.bytes_per_group(),
            n => n.clamp(BYTES_PER_LINE_MIN, BYTES_PER_LINE_MAX) as u32,
        };

        self.calc_width_for_bytes(layout, bytes)
    }

    fn calc_height(&mut self, layout: &LayoutCtx) {
        let bpl = self.calc_bytes_per_line(layout);

        self.bytes_per_line_actual = bpl;
        self.bytes_per_group = layout.bytes_per_group();
        self.show_ascii = layout.show_ascii;
        self.first_line_pad_bytes = (self.d_offset % bpl as u64) as u32;

        self.offset_text_x = layout.indent_width(self.base.indent_depth);
        self.hex_text_x = self.offset_text_x + layout.offset_column_width();
        self.ascii_text_x = self.hex_text_x + Self::hex_width(layout, bpl) + layout.char_width();

        let bytes = self.first_line_pad_bytes as u64 + self.d_length;
        let data_lines = bytes.div_ceil(bpl as u64).max(1) as i64;

        self.base.y_lines = data_lines + self.base.indent_final as i64;
    }

    fn draw(&self, ctx: &DrawCtx, canvas: &mut dyn Canvas, x: i32, y: i64) {
        draw_container(ctx, canvas, x, y, &self.base);

        let layout = ctx.layout;
        let ch = layout.char_height() as i64;
        let data_lines = self.data_lines();

        let first_row = if y < 0 { (-y) / ch } else { 0 };
        let last_row = ((layout.client_height as i64 - y + ch - 1) / ch).min(data_lines);
        if first_row >= last_row {
            return;
        }

        let bpl = self.bytes_per_line_actual as u64;
        let pad = self.first_line_pad_bytes as u64;
        let row_start = |row: i64| (self.d_offset + (row as u64 * bpl)).saturating_sub(pad).max(self.d_offset);

        let start = row_start(first_row);
        let end = row_start(last_row).min(self.d_end());

        // Read enough context around the visible bytes to find matches crossing its edges
        let context = ctx
            .selection_match
            .map_or(0, |m| (m.len() as u64).saturating_sub(1));
        let window_start = start.saturating_sub(context).max(self.d_offset);
        let window_end = (end + context).min(self.d_end());
        let window = ctx.doc.read_data(window_start, window_end - window_start);
        let matched = ctx
            .selection_match
            .map(|needle| match_mask(&window, needle))
            .unwrap_or_default();

        let byte_at = |off: u64| window.get((off - window_start) as usize).copied();
        let alternate_fg = ctx.palette.get(ColourIndex::AlternateTextFg);

        for row in first_row..last_row {
            let line_y = (y + row * ch) as i32;

            if layout.show_offsets {
                canvas.text(
                    x + self.offset_text_x,
                    line_y,
                    &layout.offset_base.format(row_start(row)),
                    alternate_fg,
                    false,
                );
            }

            // Group the line's bytes into runs of identical style
            let mut runs: Vec<(u32, u32, CellStyle)> = Vec::new();
            for col in 0..self.bytes_per_line_actual {
                let Some(off) = self.offset_at_cell(row, col) else {
                    continue;
                };
                let is_match = matched
                    .get((off - window_start) as usize)
                    .copied()
                    .unwrap_or(false);
                let style = self.cell_style(ctx, off, is_match);

                match runs.last_mut() {
                    Some((_, last, run_style)) if *last + 1 == col && *run_style == style => *last = col,
                    _ => runs.push((col, col, style)),
                }
            }

            for &(first, last, style) in &runs {
                let mut hex = String::new();
                let mut ascii = String::new();
                for col in first..=last {
                    let byte = self
                        .offset_at_cell(row, col)
                        .and_then(byte_at)
                        .unwrap_or(0);
                    hex.push_str(&format!("{:02X}", byte));
                    if col != last && (col + 1) % self.bytes_per_group == 0 {
                        hex.push(' ');
                    }
                    ascii.push(ascii_char(byte));
                }

                let hex_x = x + self.hex_text_x + layout.string_width(self.hex_char_index(first));
                let ascii_x = x + self.ascii_text_x + layout.string_width(first as usize);

                if let Some(bg) = style.bg {
                    let hex_w = layout.string_width(self.hex_char_index(last) + 2)
                        - layout.string_width(self.hex_char_index(first));
                    canvas.fill_rect(hex_x, line_y, hex_w, ch as i32, bg);

                    if self.show_ascii {
                        let ascii_w = layout.string_width(last as usize + 1)
                            - layout.string_width(first as usize);
                        canvas.fill_rect(ascii_x, line_y, ascii_w, ch as i32, bg);
                    }
                }

                canvas.text(hex_x, line_y, &hex, style.fg, style.strong);
                if self.show_ascii {
                    canvas.text(ascii_x, line_y, &ascii, style.fg, style.strong);
                }
            }

            if ctx.draw_cursor && self.row_of(ctx.cursor.pos) == row {
                let byte = if ctx.cursor.pos < self.d_end() {
                    byte_at(ctx.cursor.pos)
                } else {
                    None
                };
                self.draw_cursor(ctx, canvas, x, line_y, byte);
            }
        }
    }

    fn cursor_for_point(&self, layout: &LayoutCtx, x: i32, y_lines: i64, _y_px: i32) -> PointerHint {
        match self.offset_at_xy(layout, x, y_lines) {
            Some((_, ScreenArea::Hex | ScreenArea::Ascii)) => PointerHint::Text,
            _ => PointerHint::Default,
        }
    }

    fn as_data_region(&self) -> Option<&dyn GenericDataRegion> {
        Some(self)
    }

    fn as_data_region_mut(&mut self) -> Option<&mut dyn GenericDataRegion> {
        Some(self)
    }
}

impl<H: DataRegionHooks> GenericDataRegion for DataRegion<H> {
    fn d_offset(&self) -> u64 {
        self.d_offset
    }

    fn d_length(&self) -> u64 {
        self.d_length
    }

    fn offset_at_xy(&self, layout: &LayoutCtx, x: i32, y_lines: i64) -> Option<(u64, ScreenArea)> {
        if y_lines < 0 || y_lines >= self.data_lines() {
            return None;
        }

        let row = y_lines;

        if layout.show_offsets && x >= self.offset_text_x && x < self.hex_text_x {
            // Gutter clicks address the first byte of the line
            let first_col = if row == 0 { self.first_line_pad_bytes } else { 0 };
            return self
                .offset_at_cell(row, first_col)
                .map(|off| (off, ScreenArea::Offset));
        }

        if x >= self.hex_text_x && x < self.hex_column_end(layout) {
            let col = self.hex_column_at(layout, x - self.hex_text_x)?.ok()?;
            return self.offset_at_cell(row, col).map(|off| (off, ScreenArea::Hex));
        }

        let ascii_end = self.ascii_text_x + layout.string_width(self.bytes_per_line_actual as usize);
        if self.show_ascii && x >= self.ascii_text_x && x < ascii_end {
            let col = layout.metrics.char_at_x(x - self.ascii_text_x)? as u32;
            return self.offset_at_cell(row, col).map(|off| (off, ScreenArea::Ascii));
        }

        None
    }

    fn offset_near_xy(
        &self,
        layout: &LayoutCtx,
        x: i32,
        y_lines: i64,
        hint: ScreenArea,
    ) -> Option<(u64, ScreenArea)> {
        if self.d_length == 0 {
            return None;
        }

        let row = y_lines.clamp(0, self.data_lines() - 1);
        let bpl = self.bytes_per_line_actual;

        // An explicit column hint always wins; otherwise the nearest column,
        // with the hex column taking an exact tie in the gap between them.
        let area = match hint {
            ScreenArea::Hex => ScreenArea::Hex,
            ScreenArea::Ascii if self.show_ascii => ScreenArea::Ascii,
            _ if !self.show_ascii => ScreenArea::Hex,
            _ => {
                let hex_end = self.hex_column_end(layout);
                if x >= self.ascii_text_x {
                    ScreenArea::Ascii
                } else if x >= hex_end && (self.ascii_text_x - x) < (x - hex_end + 1) {
                    ScreenArea::Ascii
                } else {
                    ScreenArea::Hex
                }
            }
        };

        let col = if area == ScreenArea::Ascii {
            match layout.metrics.char_at_x(x - self.ascii_text_x) {
                Some(col) => (col as u32).min(bpl - 1),
                None => 0,
            }
        } else {
            match self.hex_column_at(layout, x - self.hex_text_x) {
                Some(Ok(col)) | Some(Err(col)) => col.min(bpl - 1),
                None => 0,
            }
        };

        let pad = self.first_line_pad_bytes as u64;
        let rel = (row as u64 * bpl as u64 + col as u64).clamp(pad, pad + self.d_length - 1);

        Some((self.d_offset + rel - pad, area))
    }

    fn cursor_left_from(&self, pos: u64) -> CursorMove {
        if pos <= self.d_offset {
            CursorMove::PrevRegion
        } else {
            CursorMove::To((pos - 1).min(self.d_end()))
        }
    }

    fn cursor_right_from(&self, pos: u64) -> CursorMove {
        if pos + 1 >= self.d_end() {
            CursorMove::NextRegion
        } else {
            CursorMove::To((pos + 1).max(self.d_offset))
        }
    }

    fn cursor_up_from(&self, pos: u64) -> CursorMove {
        let (row, col) = self.visual_pos(pos.clamp(self.d_offset, self.d_end()));
        if row <= 0 {
            CursorMove::PrevRegion
        } else {
            CursorMove::To(self.nth_row_nearest_column(row - 1, col))
        }
    }

    fn cursor_down_from(&self, pos: u64) -> CursorMove {
        let (row, col) = self.visual_pos(pos.clamp(self.d_offset, self.d_end()));
        if row + 1 >= self.data_lines() {
            CursorMove::NextRegion
        } else {
            CursorMove::To(self.nth_row_nearest_column(row + 1, col))
        }
    }

    fn cursor_home_from(&self, pos: u64) -> u64 {
        self.nth_row_nearest_column(self.row_of(pos), 0)
    }

    fn cursor_end_from(&self, pos: u64) -> u64 {
        self.nth_row_nearest_column(self.row_of(pos), self.bytes_per_line_actual - 1)
    }

    fn cursor_column(&self, pos: u64) -> u32 {
        self.visual_pos(pos.clamp(self.d_offset, self.d_end())).1
    }

    fn first_row_nearest_column(&self, column: u32) -> u64 {
        self.nth_row_nearest_column(0, column)
    }

    fn last_row_nearest_column(&self, column: u32) -> u64 {
        self.nth_row_nearest_column(self.data_lines() - 1, column)
    }

    fn nth_row_nearest_column(&self, row: i64, column: u32) -> u64 {
        if self.d_length == 0 {
            return self.d_offset;
        }

        let bpl = self.bytes_per_line_actual as u64;
        let pad = self.first_line_pad_bytes as u64;
        let row = row.clamp(0, self.data_lines() - 1) as u64;
        let col = (column as u64).min(bpl - 1);

        let rel = (row * bpl + col).clamp(pad, pad + self.d_length - 1);
        self.d_offset + rel - pad
    }

    fn calc_offset_bounds(&self, layout: &LayoutCtx, offset: u64, area: ScreenArea) -> Rect {
        if offset < self.d_offset || offset > self.d_end() {
            return Rect::UNDEFINED;
        }

        let (row, col) = self.visual_pos(offset);

        let (x, w) = if area == ScreenArea::Ascii && self.show_ascii {
            let x = self.ascii_text_x + layout.string_width(col as usize);
            (x, layout.string_width(col as usize + 1) - layout.string_width(col as usize))
        } else {
            let idx = self.hex_char_index(col);
            let x = self.hex_text_x + layout.string_width(idx);
            (x, layout.string_width(idx + 2) - layout.string_width(idx))
        };

        Rect {
            x,
            y: self.base.y_offset + row,
            w,
            h: 1,
        }
    }

    fn on_char(&mut self, doc: &mut dyn Document, ctx: &EditCtx, ch: char) -> bool {
        self.hooks.on_char(doc, ctx, ch)
    }

    fn on_copy(&self, doc: &dyn Document, ctx: &EditCtx) -> Option<String> {
        self.hooks.on_copy(doc, ctx)
    }

    fn on_paste(&mut self, doc: &mut dyn Document, ctx: &EditCtx, text: &str) -> bool {
        self.hooks.on_paste(doc, ctx, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HighlightColour, MemoryDocument};
    use crate::editor::canvas::RecordingCanvas;
    use crate::editor::layout::CursorView;
    use crate::editor::palette::Palette;

    fn layout(bytes_per_line: i32, bytes_per_group: i32, width: i32) -> LayoutCtx {
        LayoutCtx {
            bytes_per_line,
            bytes_per_group,
            client_width: width,
            client_height: 480,
            virtual_width: width,
            ..LayoutCtx::default()
        }
    }

    fn region(d_offset: u64, d_length: u64, layout: &LayoutCtx) -> DataRegion {
        let mut region = DataRegion::new(d_offset, d_length);
        region.calc_height(layout);
        region
    }

    fn draw_ctx<'a>(layout: &'a LayoutCtx, doc: &'a MemoryDocument, palette: &'a Palette) -> DrawCtx<'a> {
        DrawCtx {
            layout,
            doc,
            palette,
            cursor: CursorView {
                pos: 0,
                state: CursorState::Hex,
                insert: false,
            },
            draw_cursor: false,
            selection: (0, 0),
            selection_match: None,
        }
    }

    #[test]
    fn test_sixteen_bytes_in_groups_of_four() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 32, &layout);
        assert_eq!(region.base().y_lines, 2);

        let doc = MemoryDocument::new((0u8..32).collect());
        let palette = Palette::default();
        let ctx = draw_ctx(&layout, &doc, &palette);

        let mut canvas = RecordingCanvas::default();
        region.draw(&ctx, &mut canvas, 0, 0);

        assert_eq!(canvas.text_rows(), vec![0, 16]);

        let hex_x = layout.offset_column_width();
        let row0 = canvas.texts_at_y(0);
        assert!(row0.contains(&(hex_x, "00010203 04050607 08090A0B 0C0D0E0F".to_string())));
        let row1 = canvas.texts_at_y(16);
        assert!(row1.contains(&(hex_x, "10111213 14151617 18191A1B 1C1D1E1F".to_string())));
        assert!(row1.contains(&(0, "00000000:00000010".to_string())));
    }

    #[test]
    fn test_fit_to_width() {
        // gutter 144 + hex 16n + gaps + gap char 8 + ASCII 8n
        let layout = layout(BYTES_PER_LINE_FIT_BYTES, 4, 780);
        let region = region(0, 1000, &layout);
        assert_eq!(region.bytes_per_line_actual(), 24);
        assert!(region.calc_width_for_bytes(&layout, 24) <= 780);
        assert!(region.calc_width_for_bytes(&layout, 25) > 780);
    }

    #[test]
    fn test_fit_to_groups() {
        let bytes = region(0, 1000, &layout(BYTES_PER_LINE_FIT_BYTES, 8, 800));
        assert_eq!(bytes.bytes_per_line_actual(), 26);

        let groups = region(0, 1000, &layout(BYTES_PER_LINE_FIT_GROUPS, 8, 800));
        assert_eq!(groups.bytes_per_line_actual(), 24);
    }

    #[test]
    fn test_fit_too_narrow_keeps_minimum() {
        let bytes = region(0, 10, &layout(BYTES_PER_LINE_FIT_BYTES, 4, 10));
        assert_eq!(bytes.bytes_per_line_actual(), 1);
        assert_eq!(bytes.base().y_lines, 10);

        let groups = region(0, 10, &layout(BYTES_PER_LINE_FIT_GROUPS, 4, 10));
        assert_eq!(groups.bytes_per_line_actual(), 4);
    }

    #[test]
    fn test_calc_height_idempotent() {
        let layout = layout(BYTES_PER_LINE_FIT_GROUPS, 4, 900);
        let mut region = DataRegion::<PlainData>::new(5, 300);
        region.base_mut().indent_final = 2;

        region.calc_height(&layout);
        let first = (region.base().clone(), region.calc_width(&layout));
        region.calc_height(&layout);
        let second = (region.base().clone(), region.calc_width(&layout));

        assert_eq!(first, second);
    }

    #[test]
    fn test_first_line_padding() {
        let layout = layout(16, 4, 1024);
        let region = region(20, 30, &layout);

        assert_eq!(region.first_line_pad_bytes(), 4);
        // 4 pad + 30 bytes over 16 per line
        assert_eq!(region.base().y_lines, 3);
        assert_eq!(region.first_row_nearest_column(0), 20);
        assert_eq!(region.first_row_nearest_column(5), 21);
        assert_eq!(region.last_row_nearest_column(15), 49);
    }

    #[test]
    fn test_hit_test_round_trip() {
        let layout = layout(16, 4, 1024);
        let mut region = DataRegion::<PlainData>::new(20, 60);
        region.base_mut().y_offset = 7;
        region.calc_height(&layout);

        for y_lines in 0..region.data_lines() {
            for x in (0..layout.virtual_width).step_by(3) {
                let Some((offset, area)) = region.offset_at_xy(&layout, x, y_lines) else {
                    continue;
                };
                if area == ScreenArea::Offset {
                    continue;
                }

                let bounds = region.calc_offset_bounds(&layout, offset, area);
                assert!(
                    bounds.contains(x, 7 + y_lines),
                    "x={} line={} offset={} bounds={:?}",
                    x,
                    y_lines,
                    offset,
                    bounds
                );
            }
        }
    }

    #[test]
    fn test_hit_test_gap_and_padding() {
        let layout = layout(16, 4, 1024);
        let region = region(20, 30, &layout);
        let hex_x = layout.offset_column_width();

        // First line columns 0-3 are padding
        assert_eq!(region.offset_at_xy(&layout, hex_x, 0), None);
        // Column 4 starts after the first group and its gap
        assert_eq!(
            region.offset_at_xy(&layout, hex_x + 9 * 8, 0),
            Some((20, ScreenArea::Hex))
        );
        // Gap after the second group
        assert_eq!(region.offset_at_xy(&layout, hex_x + 17 * 8, 0), None);
        assert_eq!(
            region.offset_near_xy(&layout, hex_x + 17 * 8, 0, ScreenArea::Hex),
            Some((23, ScreenArea::Hex))
        );
    }

    #[test]
    fn test_offset_near_xy_clamps() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 20, &layout);

        assert_eq!(
            region.offset_near_xy(&layout, -50, -3, ScreenArea::None),
            Some((0, ScreenArea::Hex))
        );
        assert_eq!(
            region.offset_near_xy(&layout, 5000, 40, ScreenArea::Hex),
            Some((19, ScreenArea::Hex))
        );
        assert_eq!(
            region.offset_near_xy(&layout, 5000, 0, ScreenArea::None),
            Some((15, ScreenArea::Ascii))
        );
    }

    #[test]
    fn test_offset_near_xy_hint_wins() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 32, &layout);
        let ascii_x = region.calc_offset_bounds(&layout, 3, ScreenArea::Ascii).x;

        assert_eq!(
            region.offset_near_xy(&layout, ascii_x, 0, ScreenArea::Hex),
            Some((15, ScreenArea::Hex))
        );
        assert_eq!(
            region.offset_near_xy(&layout, ascii_x, 0, ScreenArea::None),
            Some((3, ScreenArea::Ascii))
        );
    }

    #[test]
    fn test_offset_near_xy_empty_region() {
        let layout = layout(16, 4, 1024);
        let region = region(64, 0, &layout);
        assert_eq!(region.offset_near_xy(&layout, 200, 0, ScreenArea::Hex), None);
        assert_eq!(region.base().y_lines, 1);
    }

    #[test]
    fn test_end_of_full_line_stays_on_last_row() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 32, &layout);

        let bounds = region.calc_offset_bounds(&layout, 32, ScreenArea::Hex);
        assert_eq!(bounds.y, 1);
        let last = region.calc_offset_bounds(&layout, 31, ScreenArea::Hex);
        assert_eq!(bounds.x, last.x + last.w);
    }

    #[test]
    fn test_navigation_sentinels() {
        let layout = layout(16, 4, 1024);
        let region = region(16, 32, &layout);

        assert_eq!(region.cursor_left_from(16), CursorMove::PrevRegion);
        assert_eq!(region.cursor_left_from(17), CursorMove::To(16));
        assert_eq!(region.cursor_right_from(46), CursorMove::To(47));
        assert_eq!(region.cursor_right_from(47), CursorMove::NextRegion);
        assert_eq!(region.cursor_up_from(20), CursorMove::PrevRegion);
        assert_eq!(region.cursor_up_from(36), CursorMove::To(20));
        assert_eq!(region.cursor_down_from(20), CursorMove::To(36));
        assert_eq!(region.cursor_down_from(36), CursorMove::NextRegion);
        assert_eq!(region.cursor_home_from(40), 32);
        assert_eq!(region.cursor_end_from(40), 47);
        assert_eq!(region.cursor_column(40), 8);
    }

    #[test]
    fn test_doc_highlight_lookup() {
        let mut doc = MemoryDocument::new(vec![0; 32]);
        assert!(doc.set_highlight(4, 8, HighlightColour(2)));
        assert!(doc.set_highlight(6, 2, HighlightColour(5)));

        let region = DataRegionDocHighlight::new(0, 32);
        assert_eq!(region.highlight_at_off(&doc, 0), None);
        assert_eq!(
            region.highlight_at_off(&doc, 5).map(|h| h.bg),
            Some(ColourIndex::HighlightBg(2))
        );
        assert_eq!(
            region.highlight_at_off(&doc, 7).map(|h| h.bg),
            Some(ColourIndex::HighlightBg(5))
        );

        let plain = DataRegion::<PlainData>::new(0, 32);
        assert_eq!(plain.highlight_at_off(&doc, 5), None);
    }

    #[test]
    fn test_selection_drawn_as_one_run() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 16, &layout);
        let doc = MemoryDocument::new(vec![0xAA; 16]);
        let palette = Palette::default();
        let mut ctx = draw_ctx(&layout, &doc, &palette);
        ctx.selection = (2, 4);

        let mut canvas = RecordingCanvas::default();
        region.draw(&ctx, &mut canvas, 0, 0);

        let hex_x = layout.offset_column_width();
        let row = canvas.texts_at_y(0);
        assert!(row.contains(&(hex_x, "AAAA".to_string())));
        assert!(row.contains(&(hex_x + 4 * 8, "AAAA AAAA".to_string())));
        // Hex and ASCII backgrounds
        assert_eq!(canvas.fills_with(palette.get(ColourIndex::SelectedTextBg)), 2);
    }

    #[test]
    fn test_match_mask() {
        assert_eq!(
            match_mask(b"abcabca", b"ca"),
            vec![false, false, true, true, false, true, true]
        );
        assert_eq!(match_mask(b"aaa", b"aa"), vec![true, true, true]);
        assert_eq!(match_mask(b"ab", b"abc"), vec![false, false]);
        assert_eq!(match_mask(b"ab", b""), vec![false, false]);
    }

    #[test]
    fn test_draw_skips_lines_above_view() {
        let layout = layout(16, 4, 1024);
        let region = region(0, 16 * 100, &layout);
        let doc = MemoryDocument::new(vec![0; 1600]);
        let palette = Palette::default();
        let ctx = draw_ctx(&layout, &doc, &palette);

        let mut canvas = RecordingCanvas::default();
        region.draw(&ctx, &mut canvas, 0, -16 * 90);

        // Rows 90..100 land at y = 0..160
        assert_eq!(canvas.text_rows(), (0..10).map(|r| r * 16).collect::<Vec<_>>());
    }
}
