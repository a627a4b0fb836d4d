//! Layout parameters shared by every region

use serde::{Deserialize, Serialize};

use super::metrics::FontMetrics;
use super::palette::Palette;
use crate::document::{CursorState, Document};

/// Pack as many whole bytes as fit in the available width
pub const BYTES_PER_LINE_FIT_BYTES: i32 = 0;
/// Pack as many whole groups as fit in the available width
pub const BYTES_PER_LINE_FIT_GROUPS: i32 = -1;
pub const BYTES_PER_LINE_MIN: i32 = 1;
pub const BYTES_PER_LINE_MAX: i32 = 128;

/// Numeric base of the offset gutter
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum OffsetBase {
    #[default]
    Hex,
    Decimal,
    Octal,
}

impl OffsetBase {
    /// Characters needed to show any 64-bit offset
    pub fn text_chars(self) -> usize {
        match self {
            OffsetBase::Hex => 17,
            OffsetBase::Decimal => 20,
            OffsetBase::Octal => 22,
        }
    }

    pub fn format(self, offset: u64) -> String {
        match self {
            OffsetBase::Hex => format!("{:08X}:{:08X}", offset >> 32, offset & 0xFFFF_FFFF),
            OffsetBase::Decimal => format!("{:020}", offset),
            OffsetBase::Octal => format!("{:022o}", offset),
        }
    }
}

/// Font and column configuration every region lays itself out against
pub struct LayoutCtx {
    pub metrics: FontMetrics,
    pub bytes_per_line: i32,
    pub bytes_per_group: i32,
    pub show_offsets: bool,
    pub offset_base: OffsetBase,
    pub show_ascii: bool,
    pub highlight_selection_match: bool,

    /// Size of the visible area in pixels
    pub client_width: i32,
    pub client_height: i32,

    /// Width all regions are laid out in; at least `client_width`
    pub virtual_width: i32,
}

impl Default for LayoutCtx {
    fn default() -> Self {
        Self {
            metrics: FontMetrics::default(),
            bytes_per_line: BYTES_PER_LINE_FIT_GROUPS,
            bytes_per_group: 4,
            show_offsets: true,
            offset_base: OffsetBase::Hex,
            show_ascii: true,
            highlight_selection_match: false,
            client_width: 0,
            client_height: 0,
            virtual_width: 0,
        }
    }
}

impl LayoutCtx {
    pub fn char_width(&self) -> i32 {
        self.metrics.char_width()
    }

    pub fn char_height(&self) -> i32 {
        self.metrics.char_height()
    }

    pub fn string_width(&self, chars: usize) -> i32 {
        self.metrics.string_width(chars)
    }

    /// Horizontal space taken by `depth` levels of indentation on one side
    pub fn indent_width(&self, depth: i32) -> i32 {
        depth.max(0) * self.char_width()
    }

    /// Width of the offset gutter, including one character of padding
    pub fn offset_column_width(&self) -> i32 {
        if self.show_offsets {
            self.string_width(self.offset_base.text_chars() + 1)
        } else {
            0
        }
    }

    pub fn bytes_per_group(&self) -> u32 {
        self.bytes_per_group.max(1) as u32
    }
}

/// Cursor as the drawing code sees it
#[derive(Clone, Copy, Debug)]
pub struct CursorView {
    pub pos: u64,
    pub state: CursorState,
    pub insert: bool,
}

/// Everything a region needs to paint itself
pub struct DrawCtx<'a> {
    pub layout: &'a LayoutCtx,
    pub doc: &'a dyn Document,
    pub palette: &'a Palette,
    pub cursor: CursorView,
    /// Whether this region owns the cursor and the blink phase is on
    pub draw_cursor: bool,
    /// Selected range as (offset, length)
    pub selection: (u64, u64),
    /// Selected bytes, when other occurrences should be highlighted
    pub selection_match: Option<&'a [u8]>,
}

impl DrawCtx<'_> {
    pub fn is_selected(&self, offset: u64) -> bool {
        let (off, len) = self.selection;
        offset >= off && offset - off < len
    }
}
