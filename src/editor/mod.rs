//! Document view control: region layout, scrolling, cursor and selection
//!
//! [`DocumentCtrl`] stacks a list of regions vertically and maps between
//! screen positions, lines and byte offsets. It knows nothing about the
//! host toolkit: the host forwards input through the `on_*` methods, calls
//! [`DocumentCtrl::paint`] with a [`Canvas`], and drains [`CtrlEvent`]s.

pub mod canvas;
mod clipboard;
pub mod comment_region;
mod cursor;
pub mod data_region;
mod input;
pub mod layout;
pub mod linked_scroll;
pub mod metrics;
pub mod palette;
pub mod region;
pub mod regions;
mod selection;

use std::rc::Rc;

pub use canvas::Canvas;
pub use input::{Key, KeyEvent, Modifiers};
pub use layout::{OffsetBase, BYTES_PER_LINE_FIT_BYTES, BYTES_PER_LINE_FIT_GROUPS};
pub use metrics::{FixedGlyphs, FontMetrics, GlyphSource};
pub use palette::Palette;
pub use region::{GenericDataRegion, PointerHint, Region, ScreenArea};
pub use regions::InlineCommentMode;

use crate::document::{CursorState, Document, DocumentError, SharedDocument};
use data_region::DataRegionDocHighlight;
use layout::{CursorView, DrawCtx, LayoutCtx, BYTES_PER_LINE_MAX};
use linked_scroll::ScrollLink;
use palette::ColourIndex;
use region::EditCtx;

/// Scrollbar positions are divided down so the range stays below this
const SCROLLBAR_STEPS: i64 = 10_000;

/// Longest selection whose other occurrences are highlighted
const SELECTION_MATCH_MAX: u64 = 4096;

/// Builds the region list from the document after every edit
pub type RegionBuilder = Box<dyn Fn(&dyn Document) -> Vec<Box<dyn Region>>>;

/// Notifications queued for the owner of a control
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CtrlEvent {
    CursorMoved { offset: u64, state: CursorState },
    SelectionChanged { offset: u64, length: u64 },
    ScrollChanged { yoff: i64 },
    DataModified,
    CommentClicked { offset: u64, length: u64 },
    ContextMenu { offset: u64 },
}

/// Scrollbar requests, in scaled scrollbar steps where a position is involved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    Top,
    Bottom,
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    ThumbTrack(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

/// Vertical scrollbar geometry in scaled steps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollbarThumb {
    pub position: i64,
    pub range: i64,
    pub page: i64,
}

/// Mouse selection in progress
#[derive(Clone, Copy, Debug)]
struct DragState {
    anchor: u64,
    area: ScreenArea,
}

pub struct DocumentCtrl {
    doc: SharedDocument,

    regions: Vec<Box<dyn Region>>,
    /// Indices into `regions` of byte-backed regions, in offset order
    data_regions: Vec<usize>,
    region_builder: RegionBuilder,
    comment_mode: InlineCommentMode,

    layout: LayoutCtx,
    palette: Palette,

    visible_lines: i64,
    scroll: Rc<ScrollLink>,
    scroll_xoff: i32,
    scroll_ydiv: i64,
    wheel_vrot: i32,
    wheel_hrot: i32,

    cpos_off: u64,
    cursor_state: CursorState,
    insert_mode: bool,
    cursor_visible: bool,

    selection_off: u64,
    selection_length: u64,
    selection_anchor: Option<u64>,

    drag: Option<DragState>,
    last_mouse: Option<(i32, i32)>,

    events: Vec<CtrlEvent>,
}

fn comment_builder(mode: InlineCommentMode) -> RegionBuilder {
    Box::new(move |doc: &dyn Document| regions::compute_regions(doc, mode))
}

impl DocumentCtrl {
    pub fn new(doc: SharedDocument) -> Self {
        let mut ctrl = Self {
            doc,
            regions: Vec::new(),
            data_regions: Vec::new(),
            region_builder: comment_builder(InlineCommentMode::default()),
            comment_mode: InlineCommentMode::default(),
            layout: LayoutCtx::default(),
            palette: Palette::default(),
            visible_lines: 0,
            scroll: ScrollLink::new(),
            scroll_xoff: 0,
            scroll_ydiv: 1,
            wheel_vrot: 0,
            wheel_hrot: 0,
            cpos_off: 0,
            cursor_state: CursorState::Hex,
            insert_mode: false,
            cursor_visible: true,
            selection_off: 0,
            selection_length: 0,
            selection_anchor: None,
            drag: None,
            last_mouse: None,
            events: Vec::new(),
        };

        ctrl.refresh_regions();
        ctrl
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn layout(&self) -> &LayoutCtx {
        &self.layout
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn regions(&self) -> &[Box<dyn Region>] {
        &self.regions
    }

    /// Take every notification queued since the last call
    pub fn take_events(&mut self) -> Vec<CtrlEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn buffer_length(&self) -> u64 {
        self.doc.borrow().buffer_length()
    }

    // ---- Region list ----

    /// Install a new region list, taking ownership of it
    ///
    /// Indentation is derived from each region's indent range, layout is
    /// recomputed and the cursor and selection are moved back inside the
    /// data regions.
    pub fn replace_all_regions(&mut self, mut regions: Vec<Box<dyn Region>>) {
        if regions.is_empty() {
            regions.push(Box::new(DataRegionDocHighlight::new(0, 0)));
        }

        let mut indent_to: Vec<u64> = Vec::new();
        for i in 0..regions.len() {
            let indent_offset = regions[i].base().indent_offset;

            while let Some(&end) = indent_to.last() {
                if i == 0 || indent_offset < end {
                    break;
                }
                indent_to.pop();
                regions[i - 1].base_mut().indent_final += 1;
            }

            let base = regions[i].base_mut();
            base.indent_depth = indent_to.len() as i32;
            base.indent_final = 0;

            if base.indent_length > 0 {
                indent_to.push(base.indent_offset.saturating_add(base.indent_length));
            }
        }
        if let Some(last) = regions.last_mut() {
            last.base_mut().indent_final += indent_to.len() as i32;
        }

        let mut data_regions: Vec<usize> = regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.as_data_region().is_some())
            .map(|(i, _)| i)
            .collect();

        if data_regions.is_empty() {
            data_regions.push(regions.len());
            regions.push(Box::new(DataRegionDocHighlight::new(self.buffer_length(), 0)));
        }

        self.regions = regions;
        self.data_regions = data_regions;
        self.handle_width_change();

        self.cpos_off = self.clamp_to_data_regions(self.cpos_off);
        self.set_selection(self.selection_off, self.selection_length);

        log::debug!(
            "Installed {} regions ({} data), {} lines",
            self.regions.len(),
            self.data_regions.len(),
            self.total_lines()
        );
    }

    /// Replace the function used to rebuild regions after edits
    pub fn set_region_builder(&mut self, builder: RegionBuilder) {
        self.region_builder = builder;
        self.refresh_regions();
    }

    pub fn inline_comment_mode(&self) -> InlineCommentMode {
        self.comment_mode
    }

    pub fn set_inline_comment_mode(&mut self, mode: InlineCommentMode) {
        self.comment_mode = mode;
        self.set_region_builder(comment_builder(mode));
    }

    /// Rebuild the region list from the current document contents
    pub fn refresh_regions(&mut self) {
        let regions = {
            let doc = self.doc.borrow();
            (self.region_builder)(&*doc)
        };
        self.replace_all_regions(regions);
    }

    /// Apply an edit to the document and rebuild the regions on success
    ///
    /// A rejected edit is logged and leaves the view untouched.
    pub fn edit_document<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut dyn Document) -> Result<(), DocumentError>,
    {
        let result = edit(&mut *self.doc.borrow_mut());

        match result {
            Ok(()) => {
                self.events.push(CtrlEvent::DataModified);
                self.refresh_regions();
                true
            }
            Err(e) => {
                log::warn!("Edit rejected: {}", e);
                false
            }
        }
    }

    fn data_region(&self, index: usize) -> Option<&dyn GenericDataRegion> {
        self.regions.get(*self.data_regions.get(index)?)?.as_data_region()
    }

    /// Index into `data_regions` of the region holding `offset`
    ///
    /// The end of the last data region belongs to it.
    fn data_region_index(&self, offset: u64) -> Option<usize> {
        let idx = self
            .data_regions
            .partition_point(|&i| self.regions[i].as_data_region().map_or(true, |d| d.d_end() <= offset));

        if idx < self.data_regions.len() {
            let region = self.data_region(idx)?;
            return (region.d_offset() <= offset).then_some(idx);
        }

        let last = self.data_regions.len().checked_sub(1)?;
        (self.data_region(last)?.d_end() == offset).then_some(last)
    }

    /// Data region holding `offset`
    pub fn data_region_by_offset(&self, offset: u64) -> Option<&dyn GenericDataRegion> {
        self.data_region(self.data_region_index(offset)?)
    }

    fn data_region_by_offset_mut(&mut self, offset: u64) -> Option<&mut dyn GenericDataRegion> {
        let index = *self.data_regions.get(self.data_region_index(offset)?)?;
        self.regions[index].as_data_region_mut()
    }

    /// Index of the region covering absolute line `line`
    pub fn region_by_y_offset(&self, line: i64) -> Option<usize> {
        let idx = self.regions.partition_point(|r| r.base().y_end() <= line);
        let region = self.regions.get(idx)?;
        (region.base().y_offset <= line).then_some(idx)
    }

    /// Nearest valid cursor position to `pos`
    fn clamp_to_data_regions(&self, pos: u64) -> u64 {
        let idx = self
            .data_regions
            .partition_point(|&i| self.regions[i].as_data_region().map_or(true, |d| d.d_end() <= pos));

        match self.data_region(idx) {
            Some(region) => pos.max(region.d_offset()),
            None => self
                .data_regions
                .len()
                .checked_sub(1)
                .and_then(|last| self.data_region(last))
                .map_or(0, |last| last.d_end()),
        }
    }

    fn edit_ctx(&self) -> EditCtx {
        EditCtx {
            cursor_pos: self.cpos_off,
            cursor_state: self.cursor_state,
            insert_mode: self.insert_mode,
            selection_off: self.selection_off,
            selection_length: self.selection_length,
        }
    }

    // ---- Layout ----

    fn total_lines(&self) -> i64 {
        self.regions.last().map_or(0, |r| r.base().y_end())
    }

    /// Lay every region out again for the current width
    fn handle_width_change(&mut self) {
        let needed = self
            .regions
            .iter()
            .map(|r| r.calc_width(&self.layout))
            .max()
            .unwrap_or(0);
        self.layout.virtual_width = needed.max(self.layout.client_width);

        let mut y = 0;
        for region in &mut self.regions {
            region.base_mut().y_offset = y;
            region.calc_height(&self.layout);
            y += region.base().y_lines;
        }

        self.update_vscroll();

        let max_xoff = (self.layout.virtual_width - self.layout.client_width).max(0);
        self.scroll_xoff = self.scroll_xoff.clamp(0, max_xoff);
    }

    fn handle_height_change(&mut self) {
        self.visible_lines = (self.layout.client_height / self.layout.char_height()) as i64;
        self.update_vscroll();
    }

    /// Recompute the scroll range, keeping the relative position
    fn update_vscroll(&mut self) {
        let total = self.total_lines();
        let old_max = self.scroll.yoff_max();
        let new_max = (total - self.visible_lines).max(0);

        if new_max != old_max {
            let yoff = if old_max > 0 {
                (self.scroll.yoff() as i128 * new_max as i128 / old_max as i128) as i64
            } else {
                0
            };
            self.scroll.set_max(new_max);
            self.scroll.set_local(yoff);
        }

        self.scroll_ydiv = ((new_max + SCROLLBAR_STEPS - 1) / SCROLLBAR_STEPS).max(1);
    }

    /// Set the size of the visible area in pixels
    pub fn resize(&mut self, width: i32, height: i32) {
        if width == self.layout.client_width && height == self.layout.client_height {
            return;
        }

        self.layout.client_width = width.max(0);
        self.layout.client_height = height.max(0);
        self.handle_width_change();
        self.handle_height_change();
    }

    /// Replace the font, discarding all cached string widths
    pub fn set_font(&mut self, metrics: FontMetrics) {
        self.layout.metrics = metrics;
        self.handle_width_change();
        self.handle_height_change();
    }

    pub fn visible_lines(&self) -> i64 {
        self.visible_lines
    }

    // ---- Scrolling ----

    pub fn get_scroll_yoff(&self) -> i64 {
        self.scroll.yoff()
    }

    pub fn get_scroll_yoff_max(&self) -> i64 {
        self.scroll.yoff_max()
    }

    /// Scroll so `yoff` is the top line, moving every linked view with it
    pub fn set_scroll_yoff(&mut self, yoff: i64) {
        let old = self.scroll.yoff();
        self.scroll.set_local(yoff);

        let new = self.scroll.yoff();
        if new != old {
            self.events.push(CtrlEvent::ScrollChanged { yoff: new });
        }
        self.scroll.propagate();
    }

    pub fn scroll_xoff(&self) -> i32 {
        self.scroll_xoff
    }

    pub fn set_scroll_xoff(&mut self, xoff: i32) {
        let max_xoff = (self.layout.virtual_width - self.layout.client_width).max(0);
        self.scroll_xoff = xoff.clamp(0, max_xoff);
    }

    pub fn scrollbar_thumb(&self) -> ScrollbarThumb {
        ScrollbarThumb {
            position: self.scroll.yoff() / self.scroll_ydiv,
            range: self.scroll.yoff_max() / self.scroll_ydiv,
            page: (self.visible_lines / self.scroll_ydiv).max(1),
        }
    }

    pub fn on_scroll(&mut self, action: ScrollAction) {
        let yoff = self.scroll.yoff();
        let page = self.visible_lines.max(1);

        let target = match action {
            ScrollAction::Top => 0,
            ScrollAction::Bottom => self.scroll.yoff_max(),
            ScrollAction::LineUp => yoff - 1,
            ScrollAction::LineDown => yoff + 1,
            ScrollAction::PageUp => yoff - page,
            ScrollAction::PageDown => yoff + page,
            ScrollAction::ThumbTrack(position) => {
                if position >= self.scroll.yoff_max() / self.scroll_ydiv {
                    self.scroll.yoff_max()
                } else {
                    position.saturating_mul(self.scroll_ydiv)
                }
            }
        };

        self.set_scroll_yoff(target);
    }

    /// Accumulate wheel movement and scroll once per whole `delta`
    ///
    /// Positive rotation scrolls towards the start.
    pub fn on_wheel(&mut self, axis: WheelAxis, rotation: i32, delta: i32, lines_per_action: i32) {
        let delta = delta.max(1);

        match axis {
            WheelAxis::Vertical => {
                self.wheel_vrot += rotation;
                let steps = self.wheel_vrot / delta;
                self.wheel_vrot %= delta;
                if steps != 0 {
                    let lines = steps as i64 * lines_per_action as i64;
                    self.set_scroll_yoff(self.scroll.yoff() - lines);
                }
            }
            WheelAxis::Horizontal => {
                self.wheel_hrot += rotation;
                let steps = self.wheel_hrot / delta;
                self.wheel_hrot %= delta;
                if steps != 0 {
                    let px = steps * lines_per_action * self.layout.char_width();
                    self.set_scroll_xoff(self.scroll_xoff - px);
                }
            }
        }
    }

    /// Scroll the least amount that puts `line` on screen
    pub fn make_line_visible(&mut self, line: i64) {
        let yoff = self.scroll.yoff();
        let visible = self.visible_lines.max(1);

        if line < yoff {
            self.set_scroll_yoff(line);
        } else if line >= yoff + visible {
            self.set_scroll_yoff(line - visible + 1);
        }
    }

    /// Scroll horizontally so virtual pixels `[x, x + width)` are on screen
    pub fn make_x_visible(&mut self, x: i32, width: i32) {
        let client_width = self.layout.client_width;

        if x < self.scroll_xoff {
            self.set_scroll_xoff(x);
        } else if x + width > self.scroll_xoff + client_width {
            self.set_scroll_xoff(x + width - client_width);
        }
    }

    pub fn make_byte_visible(&mut self, offset: u64) {
        let area = if self.cursor_state == CursorState::Ascii {
            ScreenArea::Ascii
        } else {
            ScreenArea::Hex
        };

        let Some(bounds) = self
            .data_region_by_offset(offset)
            .map(|r| r.calc_offset_bounds(&self.layout, offset, area))
        else {
            return;
        };

        if bounds.is_defined() {
            self.make_line_visible(bounds.y);
            self.make_x_visible(bounds.x, bounds.w);
        }
    }

    // ---- Linked scrolling ----

    /// Join the scroll chain of `other`, directly after it
    pub fn linked_scroll_insert_self_after(&mut self, other: &DocumentCtrl) {
        ScrollLink::insert_after(&self.scroll, &other.scroll);
        self.scroll.set_local(other.scroll.yoff());
    }

    pub fn linked_scroll_remove_self(&mut self) {
        self.scroll.remove();
    }

    pub fn is_scroll_linked(&self) -> bool {
        self.scroll.is_linked()
    }

    // ---- Painting ----

    pub fn paint(&self, canvas: &mut dyn Canvas) {
        let doc = self.doc.borrow();
        let layout = &self.layout;

        canvas.fill_rect(
            0,
            0,
            layout.client_width,
            layout.client_height,
            self.palette.get(ColourIndex::NormalTextBg),
        );

        let selection_match = (layout.highlight_selection_match
            && self.selection_length > 0
            && self.selection_length <= SELECTION_MATCH_MAX)
            .then(|| doc.read_data(self.selection_off, self.selection_length));

        let cursor_owner = self
            .data_region_index(self.cpos_off)
            .and_then(|i| self.data_regions.get(i).copied());

        let yoff = self.scroll.yoff();
        let ch = layout.char_height() as i64;
        let first = self.region_by_y_offset(yoff).unwrap_or(self.regions.len());

        for (i, region) in self.regions.iter().enumerate().skip(first) {
            let y = (region.base().y_offset - yoff) * ch;
            if y >= layout.client_height as i64 {
                break;
            }

            let ctx = DrawCtx {
                layout,
                doc: &*doc,
                palette: &self.palette,
                cursor: CursorView {
                    pos: self.cpos_off,
                    state: self.cursor_state,
                    insert: self.insert_mode,
                },
                draw_cursor: self.cursor_visible && cursor_owner == Some(i),
                selection: (self.selection_off, self.selection_length),
                selection_match: selection_match.as_deref(),
            };

            region.draw(&ctx, canvas, -self.scroll_xoff, y);
        }
    }

    // ---- Configuration ----

    pub fn get_bytes_per_line(&self) -> i32 {
        self.layout.bytes_per_line
    }

    /// Fixed line length, or one of the fit sentinels
    pub fn set_bytes_per_line(&mut self, bytes_per_line: i32) {
        self.layout.bytes_per_line = if bytes_per_line < BYTES_PER_LINE_FIT_GROUPS {
            BYTES_PER_LINE_FIT_GROUPS
        } else {
            bytes_per_line.min(BYTES_PER_LINE_MAX)
        };
        self.handle_width_change();
    }

    pub fn get_bytes_per_group(&self) -> i32 {
        self.layout.bytes_per_group
    }

    pub fn set_bytes_per_group(&mut self, bytes_per_group: i32) {
        self.layout.bytes_per_group = bytes_per_group.max(1);
        self.handle_width_change();
    }

    pub fn get_show_offsets(&self) -> bool {
        self.layout.show_offsets
    }

    pub fn set_show_offsets(&mut self, show: bool) {
        self.layout.show_offsets = show;
        self.handle_width_change();
    }

    pub fn get_offset_base(&self) -> OffsetBase {
        self.layout.offset_base
    }

    pub fn set_offset_base(&mut self, base: OffsetBase) {
        self.layout.offset_base = base;
        self.handle_width_change();
    }

    pub fn get_show_ascii(&self) -> bool {
        self.layout.show_ascii
    }

    pub fn set_show_ascii(&mut self, show: bool) {
        self.layout.show_ascii = show;
        if !show && self.cursor_state == CursorState::Ascii {
            self.cursor_state = CursorState::Hex;
        }
        self.handle_width_change();
    }

    pub fn get_highlight_selection_match(&self) -> bool {
        self.layout.highlight_selection_match
    }

    pub fn set_highlight_selection_match(&mut self, enabled: bool) {
        self.layout.highlight_selection_match = enabled;
    }
}

impl Drop for DocumentCtrl {
    fn drop(&mut self) {
        self.scroll.remove();
    }
}
