//! Selection management for the document view

use super::{CtrlEvent, DocumentCtrl};

impl DocumentCtrl {
    /// Current selection as (offset, length); length 0 means nothing is selected
    pub fn get_selection(&self) -> (u64, u64) {
        (self.selection_off, self.selection_length)
    }

    pub fn has_selection(&self) -> bool {
        self.selection_length > 0
    }

    /// Select `[off, off + length)`, clamped to the document
    pub fn set_selection(&mut self, off: u64, length: u64) {
        let buffer_length = self.buffer_length();

        let (off, length) = if off >= buffer_length || length == 0 {
            (0, 0)
        } else {
            (off, length.min(buffer_length - off))
        };

        if (off, length) != (self.selection_off, self.selection_length) {
            self.selection_off = off;
            self.selection_length = length;
            self.events.push(CtrlEvent::SelectionChanged { offset: off, length });
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
        self.set_selection(0, 0);
    }

    /// Select every byte between two offsets, both included
    ///
    /// Equal offsets select nothing.
    pub(super) fn select_inclusive(&mut self, a: u64, b: u64) {
        if a == b {
            self.set_selection(0, 0);
            return;
        }

        let (start, end) = if a < b { (a, b) } else { (b, a) };
        self.set_selection(start, end - start + 1);
    }

    pub(super) fn selection_contains(&self, offset: u64) -> bool {
        offset >= self.selection_off && offset - self.selection_off < self.selection_length
    }
}
