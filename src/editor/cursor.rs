//! Cursor position, column state and keyboard navigation

use super::region::{CursorMove, GenericDataRegion};
use super::{CtrlEvent, DocumentCtrl};
use crate::document::CursorState;

/// Direction of a single cursor step
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Step {
    Left,
    Right,
    Up,
    Down,
}

impl DocumentCtrl {
    pub fn get_cursor_position(&self) -> u64 {
        self.cpos_off
    }

    pub fn get_cursor_state(&self) -> CursorState {
        self.cursor_state
    }

    pub fn get_insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn set_insert_mode(&mut self, enabled: bool) {
        self.insert_mode = enabled;
    }

    /// Whether the caret is in the visible phase of its blink
    pub fn get_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Move the cursor to `pos`, in the column named by `state`
    ///
    /// `CursorState::Goto` keeps the current column. The position is
    /// clamped into the nearest data region and scrolled into view.
    pub fn set_cursor_position(&mut self, pos: u64, state: CursorState) {
        let state = match state {
            CursorState::Goto if self.cursor_state == CursorState::HexMid => CursorState::Hex,
            CursorState::Goto => self.cursor_state,
            CursorState::Ascii if !self.layout.show_ascii => CursorState::Hex,
            state => state,
        };

        let pos = self.clamp_to_data_regions(pos);
        let changed = pos != self.cpos_off || state != self.cursor_state;

        self.cpos_off = pos;
        self.cursor_state = state;
        self.make_byte_visible(pos);
        self.cursor_visible = true;

        if changed {
            self.events.push(CtrlEvent::CursorMoved { offset: pos, state });
        }
    }

    /// Next data region in `forward` or backward direction with bytes in it
    ///
    /// The empty region at the very end is accepted going forward so the
    /// cursor can reach the end of the document.
    fn neighbour_data_region(&self, index: usize, forward: bool) -> Option<usize> {
        let last = self.data_regions.len().checked_sub(1)?;

        let mut i = index;
        loop {
            i = if forward {
                if i >= last {
                    return None;
                }
                i + 1
            } else {
                i.checked_sub(1)?
            };

            let region = self.data_region(i)?;
            if region.d_length() > 0 || (forward && i == last) {
                return Some(i);
            }
        }
    }

    /// Where one step from `pos` lands, crossing into neighbouring regions
    pub(super) fn step_from(&self, pos: u64, step: Step) -> u64 {
        let Some(index) = self.data_region_index(pos) else {
            return pos;
        };
        let Some(region) = self.data_region(index) else {
            return pos;
        };

        let column = region.cursor_column(pos);
        let mv = match step {
            Step::Left => region.cursor_left_from(pos),
            Step::Right => region.cursor_right_from(pos),
            Step::Up => region.cursor_up_from(pos),
            Step::Down => region.cursor_down_from(pos),
        };

        match mv {
            CursorMove::To(next) => next,
            CursorMove::PrevRegion => {
                match self.neighbour_data_region(index, false).and_then(|i| self.data_region(i)) {
                    Some(prev) if step == Step::Left => prev.d_end().saturating_sub(1).max(prev.d_offset()),
                    Some(prev) => prev.last_row_nearest_column(column),
                    None => pos,
                }
            }
            CursorMove::NextRegion => {
                match self.neighbour_data_region(index, true).and_then(|i| self.data_region(i)) {
                    Some(next) if step == Step::Right => next.d_offset(),
                    Some(next) => next.first_row_nearest_column(column),
                    // Stepping right off the last byte reaches the end of the document
                    None if step == Step::Right => region.d_end(),
                    None => pos,
                }
            }
        }
    }

    pub(super) fn home_from(&self, pos: u64) -> u64 {
        self.data_region_by_offset(pos)
            .map_or(pos, |r| r.cursor_home_from(pos))
    }

    pub(super) fn end_from(&self, pos: u64) -> u64 {
        self.data_region_by_offset(pos)
            .map_or(pos, |r| r.cursor_end_from(pos))
    }

    pub(super) fn document_start(&self) -> u64 {
        self.data_region(0).map_or(0, |r| r.d_offset())
    }

    pub(super) fn document_end(&self) -> u64 {
        self.data_regions
            .len()
            .checked_sub(1)
            .and_then(|last| self.data_region(last))
            .map_or(0, |r| r.d_end())
    }

    /// Move the cursor, extending the keyboard selection when `extend` is set
    pub(super) fn move_cursor_to(&mut self, pos: u64, state: CursorState, extend: bool) {
        if !extend {
            self.clear_selection();
            self.set_cursor_position(pos, state);
            return;
        }

        let anchor = *self.selection_anchor.get_or_insert(self.cpos_off);
        self.set_cursor_position(pos, state);

        let cursor = self.cpos_off;
        let (start, end) = if cursor >= anchor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        };
        self.set_selection(start, end - start);
        self.selection_anchor = Some(anchor);
    }

    /// Move `lines` lines up or down, scrolling the view by the same amount
    pub(super) fn page_move(&mut self, down: bool, extend: bool) {
        let lines = self.visible_lines.max(1);
        let step = if down { Step::Down } else { Step::Up };

        let mut pos = self.cpos_off;
        for _ in 0..lines {
            let next = self.step_from(pos, step);
            if next == pos {
                break;
            }
            pos = next;
        }

        let yoff = self.get_scroll_yoff();
        self.set_scroll_yoff(if down { yoff + lines } else { yoff - lines });
        self.move_cursor_to(pos, CursorState::Goto, extend);
    }

    /// Toggle the caret blink phase
    pub fn on_redraw_cursor(&mut self) {
        self.cursor_visible = !self.cursor_visible;
    }
}
