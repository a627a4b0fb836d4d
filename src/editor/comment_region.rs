//! Boxed free-text annotation shown above the bytes it describes

use super::canvas::Canvas;
use super::layout::{DrawCtx, LayoutCtx};
use super::palette::ColourIndex;
use super::region::{draw_container, PointerHint, Region, RegionBase};

/// Wrapped lines of a text, produced lazily
///
/// Cloning the iterator restarts wrapping from the clone's position.
#[derive(Clone)]
pub struct FormatText<'a> {
    paragraphs: std::str::Split<'a, char>,
    current: Option<&'a str>,
    columns: usize,
    skip: usize,
    remaining: Option<usize>,
}

/// Wrap `text` to `columns` characters per line
///
/// Newlines start a new paragraph. Lines break after the last whitespace
/// that fits, or mid-word when a word is longer than a line. The first
/// `from_line` lines are skipped and at most `max_lines` are produced.
pub fn format_text(text: &str, columns: usize, from_line: usize, max_lines: Option<usize>) -> FormatText<'_> {
    FormatText {
        paragraphs: text.split('\n'),
        current: None,
        columns: columns.max(1),
        skip: from_line,
        remaining: max_lines,
    }
}

impl<'a> FormatText<'a> {
    fn next_wrapped(&mut self) -> Option<&'a str> {
        let rest = match self.current.take() {
            Some(rest) => rest,
            None => self.paragraphs.next()?.trim_end_matches('\r'),
        };

        // Byte index just past the first `columns + 1` characters
        let mut fit = rest.char_indices().skip(self.columns);
        let Some((limit, _)) = fit.next() else {
            return Some(rest);
        };
        let window_end = fit.next().map_or(rest.len(), |(i, _)| i);

        let (line, tail) = match rest[..window_end].rfind(char::is_whitespace) {
            Some(ws) if ws > 0 => {
                let ws_len = rest[ws..].chars().next().map_or(1, char::len_utf8);
                (&rest[..ws], &rest[ws + ws_len..])
            }
            _ => (&rest[..limit], &rest[limit..]),
        };

        if !tail.is_empty() {
            self.current = Some(tail);
        }

        Some(line)
    }
}

impl<'a> Iterator for FormatText<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }

            let line = self.next_wrapped()?;
            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }

            if let Some(remaining) = &mut self.remaining {
                *remaining -= 1;
            }
            return Some(line);
        }
    }
}

pub struct CommentRegion {
    base: RegionBase,
    c_offset: u64,
    c_length: u64,
    c_text: String,
    truncate: bool,

    text_columns: usize,
    text_lines: i64,
}

impl CommentRegion {
    /// Comment on `[c_offset, c_offset + c_length)`
    ///
    /// With `nest_children` the regions covering the commented bytes are
    /// indented beneath the comment. With `truncate` only the first line of
    /// the text is shown.
    pub fn new(c_offset: u64, c_length: u64, c_text: impl Into<String>, nest_children: bool, truncate: bool) -> Self {
        let indent_length = if nest_children { c_length } else { 0 };

        Self {
            base: RegionBase::new(c_offset, indent_length),
            c_offset,
            c_length,
            c_text: c_text.into(),
            truncate,
            text_columns: 1,
            text_lines: 1,
        }
    }

    fn box_x(&self, layout: &LayoutCtx) -> i32 {
        layout.indent_width(self.base.indent_depth)
    }

    fn box_width(&self, layout: &LayoutCtx) -> i32 {
        (layout.virtual_width - 2 * layout.indent_width(self.base.indent_depth)).max(0)
    }

    /// Lines covered by the box, including its padding
    fn box_lines(&self) -> i64 {
        self.text_lines + 1
    }

    fn shown_lines(&self) -> Vec<String> {
        if !self.truncate {
            return format_text(&self.c_text, self.text_columns, 0, None)
                .map(str::to_string)
                .collect();
        }

        let mut lines = format_text(&self.c_text, self.text_columns, 0, Some(2));
        let mut first = lines.next().unwrap_or_default().to_string();
        if lines.next().is_some() {
            let keep = self.text_columns.saturating_sub(3);
            first = first.chars().take(keep).collect();
            first.push_str("...");
        }

        vec![first]
    }
}

impl Region for CommentRegion {
    fn base(&self) -> &RegionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RegionBase {
        &mut self.base
    }

    fn calc_height(&mut self, layout: &LayoutCtx) {
        let fits = layout.metrics.char_at_x(self.box_width(layout)).unwrap_or(0);
        self.text_columns = fits.saturating_sub(1).max(1);

        self.text_lines = if self.truncate {
            1
        } else {
            format_text(&self.c_text, self.text_columns, 0, None).count().max(1) as i64
        };

        self.base.y_lines = self.box_lines() + self.base.indent_final as i64;
    }

    fn draw(&self, ctx: &DrawCtx, canvas: &mut dyn Canvas, x: i32, y: i64) {
        draw_container(ctx, canvas, x, y, &self.base);

        let layout = ctx.layout;
        let ch = layout.char_height() as i64;
        let client_height = layout.client_height as i64;

        let box_top = y + ch / 4;
        let box_bottom = y + self.box_lines() * ch - ch / 4;
        if box_bottom <= 0 || box_top >= client_height {
            return;
        }

        let box_x = x + self.box_x(layout);
        let box_w = self.box_width(layout);

        // Clamp to just outside the client area so huge boxes stay in i32 range
        let top = box_top.max(-ch) as i32;
        let bottom = box_bottom.min(client_height + ch) as i32;
        canvas.fill_rect(box_x, top, box_w, bottom - top, ctx.palette.get(ColourIndex::CommentBg));
        canvas.outline_rect(box_x, top, box_w, bottom - top, ctx.palette.get(ColourIndex::CommentFg));

        let text_x = box_x + layout.char_width() / 2;
        let first_line = ((-(y + ch / 2)) / ch).max(0) as usize;
        let visible = (client_height / ch + 2) as usize;

        let fg = ctx.palette.get(ColourIndex::CommentFg);
        if self.truncate {
            if let Some(line) = self.shown_lines().first() {
                canvas.text(text_x, (y + ch / 2) as i32, line, fg, false);
            }
            return;
        }

        for (i, line) in format_text(&self.c_text, self.text_columns, first_line, Some(visible)).enumerate() {
            let line_y = y + ch / 2 + (first_line + i) as i64 * ch;
            if line_y >= client_height {
                break;
            }
            canvas.text(text_x, line_y as i32, line, fg, false);
        }
    }

    fn cursor_for_point(&self, layout: &LayoutCtx, x: i32, y_lines: i64, _y_px: i32) -> PointerHint {
        let box_x = self.box_x(layout);
        let in_box = x >= box_x && x < box_x + self.box_width(layout);

        if in_box && y_lines >= 0 && y_lines < self.box_lines() {
            PointerHint::Hand
        } else {
            PointerHint::Default
        }
    }

    fn comment_range(&self) -> Option<(u64, u64)> {
        Some((self.c_offset, self.c_length))
    }
}
