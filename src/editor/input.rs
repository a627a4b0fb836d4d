//! Keyboard and mouse handling for the document view
//!
//! Coordinates are pixels relative to the top-left corner of the control.
//! The host calls [`DocumentCtrl::on_select_tick`] every 100 ms while a
//! mouse selection is in progress.

use std::rc::Rc;

use super::cursor::Step;
use super::region::{GenericDataRegion, PointerHint, ScreenArea};
use super::{CtrlEvent, DocumentCtrl, DragState};
use crate::document::CursorState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Insert,
    Backspace,
    Delete,
    Escape,
    Char(char),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }
}

/// Point resolved against the region list
enum Hit {
    Data {
        offset: u64,
        area: ScreenArea,
    },
    Comment {
        offset: u64,
        length: u64,
    },
    Nothing,
}

fn state_for_area(area: ScreenArea) -> CursorState {
    if area == ScreenArea::Ascii {
        CursorState::Ascii
    } else {
        CursorState::Hex
    }
}

impl DocumentCtrl {
    /// Handle a key press; returns whether the key was used
    pub fn on_key(&mut self, event: KeyEvent) -> bool {
        let KeyEvent { key, modifiers } = event;
        let extend = modifiers.shift;
        let pos = self.cpos_off;

        match key {
            Key::Left if self.cursor_state == CursorState::HexMid && !extend => {
                self.move_cursor_to(pos, CursorState::Hex, false);
            }
            Key::Left => self.move_cursor_to(self.step_from(pos, Step::Left), CursorState::Goto, extend),
            Key::Right => self.move_cursor_to(self.step_from(pos, Step::Right), CursorState::Goto, extend),
            Key::Up => self.move_cursor_to(self.step_from(pos, Step::Up), CursorState::Goto, extend),
            Key::Down => self.move_cursor_to(self.step_from(pos, Step::Down), CursorState::Goto, extend),
            Key::Home if modifiers.ctrl => {
                self.move_cursor_to(self.document_start(), CursorState::Goto, extend)
            }
            Key::End if modifiers.ctrl => {
                self.move_cursor_to(self.document_end(), CursorState::Goto, extend)
            }
            Key::Home => self.move_cursor_to(self.home_from(pos), CursorState::Goto, extend),
            Key::End => self.move_cursor_to(self.end_from(pos), CursorState::Goto, extend),
            Key::PageUp => self.page_move(false, extend),
            Key::PageDown => self.page_move(true, extend),
            Key::Tab => {
                if !self.layout.show_ascii {
                    return false;
                }
                let state = if self.cursor_state == CursorState::Ascii {
                    CursorState::Hex
                } else {
                    CursorState::Ascii
                };
                self.set_cursor_position(pos, state);
            }
            Key::Insert => self.insert_mode = !self.insert_mode,
            Key::Escape => self.clear_selection(),
            Key::Backspace => return self.erase_backward(),
            Key::Delete => return self.erase_forward(),
            Key::Char(_) if modifiers.ctrl || modifiers.alt => return false,
            Key::Char(ch) => return self.on_char(ch),
        }

        true
    }

    fn on_char(&mut self, ch: char) -> bool {
        let ctx = self.edit_ctx();
        let pos = self.cpos_off;

        let handled = {
            let doc = Rc::clone(&self.doc);
            let mut doc = doc.borrow_mut();
            match self.data_region_by_offset_mut(pos) {
                Some(region) => region.on_char(&mut *doc, &ctx, ch),
                None => false,
            }
        };
        if handled {
            self.events.push(CtrlEvent::DataModified);
            self.refresh_regions();
            return true;
        }

        if self.cursor_state.is_hex() {
            self.type_hex_digit(ch)
        } else {
            self.type_ascii(ch)
        }
    }

    fn byte_at(&self, offset: u64) -> Option<u8> {
        self.doc.borrow().read_data(offset, 1).first().copied()
    }

    fn type_hex_digit(&mut self, ch: char) -> bool {
        let Some(nibble) = ch.to_digit(16).map(|n| n as u8) else {
            return false;
        };

        self.clear_selection();
        let pos = self.cpos_off;
        let existing = self.byte_at(pos);

        match (self.cursor_state, existing) {
            (CursorState::HexMid, Some(byte)) => {
                if self.edit_document(|doc| doc.overwrite_data(pos, &[(byte & 0xF0) | nibble])) {
                    self.set_cursor_position(pos + 1, CursorState::Hex);
                }
            }
            (_, Some(byte)) if !self.insert_mode => {
                if self.edit_document(|doc| doc.overwrite_data(pos, &[(byte & 0x0F) | (nibble << 4)])) {
                    self.set_cursor_position(pos, CursorState::HexMid);
                }
            }
            _ => {
                if self.edit_document(|doc| doc.insert_data(pos, &[nibble << 4])) {
                    self.set_cursor_position(pos, CursorState::HexMid);
                }
            }
        }

        true
    }

    fn type_ascii(&mut self, ch: char) -> bool {
        let byte = match u8::try_from(ch) {
            Ok(byte) if (0x20..=0x7E).contains(&byte) => byte,
            _ => return false,
        };

        self.clear_selection();
        let pos = self.cpos_off;
        let at_end = pos >= self.buffer_length();

        let ok = if self.insert_mode || at_end {
            self.edit_document(|doc| doc.insert_data(pos, &[byte]))
        } else {
            self.edit_document(|doc| doc.overwrite_data(pos, &[byte]))
        };
        if ok {
            self.set_cursor_position(pos + 1, CursorState::Ascii);
        }

        true
    }

    /// Erase the selection, moving the cursor to where it started
    fn erase_selection(&mut self) -> bool {
        let (off, len) = self.get_selection();
        if len == 0 {
            return false;
        }

        let erased = self.edit_document(|doc| doc.erase_data(off, len));
        if erased {
            self.clear_selection();
            self.set_cursor_position(off, CursorState::Goto);
        }
        erased
    }

    fn erase_backward(&mut self) -> bool {
        if self.erase_selection() {
            return true;
        }

        let pos = self.cpos_off;
        if self.cursor_state == CursorState::HexMid {
            // The half-typed byte under the cursor goes
            if self.edit_document(|doc| doc.erase_data(pos, 1)) {
                self.set_cursor_position(pos, CursorState::Hex);
            }
            return true;
        }

        if pos == 0 {
            return false;
        }
        if self.edit_document(|doc| doc.erase_data(pos - 1, 1)) {
            self.set_cursor_position(pos - 1, CursorState::Goto);
        }
        true
    }

    fn erase_forward(&mut self) -> bool {
        if self.erase_selection() {
            return true;
        }

        let pos = self.cpos_off;
        if pos >= self.buffer_length() {
            return false;
        }
        if self.edit_document(|doc| doc.erase_data(pos, 1)) {
            self.set_cursor_position(pos, CursorState::Goto);
        }
        true
    }

    // ---- Mouse ----

    /// Absolute line and virtual x of a point in the control
    fn point_to_line(&self, x: i32, y: i32) -> (i32, i64) {
        let ch = self.layout.char_height() as i64;
        let line = self.get_scroll_yoff() + (y as i64).div_euclid(ch);
        (x + self.scroll_xoff, line)
    }

    fn hit_test(&self, x: i32, y: i32) -> Hit {
        let (vx, line) = self.point_to_line(x, y);
        let Some(index) = self.region_by_y_offset(line) else {
            return Hit::Nothing;
        };

        let region = &self.regions[index];
        let rel = line - region.base().y_offset;

        if let Some((offset, length)) = region.comment_range() {
            return Hit::Comment { offset, length };
        }

        let Some(data) = region.as_data_region() else {
            return Hit::Nothing;
        };

        match data
            .offset_at_xy(&self.layout, vx, rel)
            .or_else(|| data.offset_near_xy(&self.layout, vx, rel, ScreenArea::None))
        {
            Some((offset, area)) => Hit::Data { offset, area },
            None if data.d_length() == 0 => Hit::Data {
                offset: data.d_offset(),
                area: ScreenArea::Hex,
            },
            None => Hit::Nothing,
        }
    }

    /// Offset a drag towards this point would reach
    fn drag_target(&self, x: i32, y: i32, hint: ScreenArea) -> Option<(u64, ScreenArea)> {
        let (vx, line) = self.point_to_line(x, y);
        let line = line.clamp(0, (self.total_lines() - 1).max(0));
        let index = self.region_by_y_offset(line)?;

        let region = &self.regions[index];
        if let Some(data) = region.as_data_region() {
            if let Some(hit) = data.offset_near_xy(&self.layout, vx, line - region.base().y_offset, hint) {
                return Some(hit);
            }
        }

        // Between data regions, snap to the nearest byte after or before
        let after = self.regions[index + 1..]
            .iter()
            .filter_map(|r| r.as_data_region())
            .find(|d| d.d_length() > 0)
            .map(|d| (d.d_offset(), hint));
        after.or_else(|| {
            self.regions[..index]
                .iter()
                .rev()
                .filter_map(|r| r.as_data_region())
                .find(|d| d.d_length() > 0)
                .map(|d| (d.d_end() - 1, hint))
        })
    }

    /// Extend the mouse selection to a point, clamped to the visible area
    fn drag_to(&mut self, x: i32, y: i32) {
        let Some(drag) = self.drag else {
            return;
        };
        let x = x.clamp(0, (self.layout.client_width - 1).max(0));
        let y = y.clamp(0, (self.layout.client_height - 1).max(0));
        let Some((offset, area)) = self.drag_target(x, y, drag.area) else {
            return;
        };

        self.set_cursor_position(offset, state_for_area(area));
        self.select_inclusive(drag.anchor, offset);
    }

    pub fn on_left_down(&mut self, x: i32, y: i32, modifiers: Modifiers) {
        self.last_mouse = Some((x, y));

        match self.hit_test(x, y) {
            Hit::Comment { offset, length } => {
                self.events.push(CtrlEvent::CommentClicked { offset, length });
            }
            Hit::Data { offset, area } => {
                let state = state_for_area(area);

                if modifiers.shift {
                    let anchor = *self.selection_anchor.get_or_insert(self.cpos_off);
                    self.set_cursor_position(offset, state);
                    self.select_inclusive(anchor, offset);
                    self.drag = Some(DragState { anchor, area });
                } else {
                    self.clear_selection();
                    self.set_cursor_position(offset, state);
                    self.selection_anchor = Some(offset);
                    self.drag = Some(DragState { anchor: offset, area });
                }
            }
            Hit::Nothing => {}
        }
    }

    pub fn on_motion(&mut self, x: i32, y: i32) {
        self.last_mouse = Some((x, y));
        self.drag_to(x, y);
    }

    pub fn on_left_up(&mut self, x: i32, y: i32) {
        if self.drag.is_some() {
            self.drag_to(x, y);
        }
        self.drag = None;
    }

    pub fn on_right_down(&mut self, x: i32, y: i32) {
        if let Hit::Data { offset, area } = self.hit_test(x, y) {
            if !self.selection_contains(offset) {
                self.clear_selection();
                self.set_cursor_position(offset, state_for_area(area));
            }
            self.events.push(CtrlEvent::ContextMenu { offset });
        }
    }

    pub fn is_selecting(&self) -> bool {
        self.drag.is_some()
    }

    /// Continue a mouse selection while the pointer is held outside the view
    ///
    /// Scrolls one line or character towards the pointer and extends the
    /// selection to the newly exposed edge. Returns whether anything moved.
    pub fn on_select_tick(&mut self) -> bool {
        let (Some(_), Some((x, y))) = (self.drag, self.last_mouse) else {
            return false;
        };

        let (width, height) = (self.layout.client_width, self.layout.client_height);
        let yoff = self.get_scroll_yoff();
        let xoff = self.scroll_xoff;

        if y < 0 {
            self.set_scroll_yoff(yoff - 1);
        } else if y >= height {
            self.set_scroll_yoff(yoff + 1);
        }
        if x < 0 {
            self.set_scroll_xoff(xoff - self.layout.char_width());
        } else if x >= width {
            self.set_scroll_xoff(xoff + self.layout.char_width());
        }

        let scrolled = self.get_scroll_yoff() != yoff || self.scroll_xoff != xoff;
        if scrolled {
            self.drag_to(x, y);
        }

        scrolled
    }

    pub fn pointer_hint_at(&self, x: i32, y: i32) -> PointerHint {
        let (vx, line) = self.point_to_line(x, y);
        let Some(index) = self.region_by_y_offset(line) else {
            return PointerHint::Default;
        };

        let region = &self.regions[index];
        let ch = self.layout.char_height();
        let y_px = y - ((region.base().y_offset - self.get_scroll_yoff()) * ch as i64) as i32;
        region.cursor_for_point(&self.layout, vx, line - region.base().y_offset, y_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, MemoryDocument};
    use crate::editor::tests::{ctrl, ctrl_with};

    const HEX_X: i32 = 18 * 8;

    const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };

    fn press(ctrl: &mut DocumentCtrl, key: Key) -> bool {
        ctrl.on_key(KeyEvent::new(key))
    }

    fn type_str(ctrl: &mut DocumentCtrl, text: &str) {
        for ch in text.chars() {
            press(ctrl, Key::Char(ch));
        }
    }

    #[test]
    fn test_overwrite_hex_digits() {
        let (doc, mut ctrl) = ctrl(4);

        type_str(&mut ctrl, "ab");
        assert_eq!(doc.borrow().data(), &[0xAB, 1, 2, 3]);
        assert_eq!(ctrl.get_cursor_position(), 1);
        assert_eq!(ctrl.get_cursor_state(), CursorState::Hex);

        type_str(&mut ctrl, "c");
        assert_eq!(doc.borrow().data(), &[0xAB, 0xC1, 2, 3]);
        assert_eq!(ctrl.get_cursor_state(), CursorState::HexMid);

        // Non-hex characters are not used
        assert!(!press(&mut ctrl, Key::Char('z')));
    }

    #[test]
    fn test_insert_hex_digits() {
        let (doc, mut ctrl) = ctrl(2);
        ctrl.set_insert_mode(true);

        type_str(&mut ctrl, "f");
        assert_eq!(doc.borrow().data(), &[0xF0, 0, 1]);
        type_str(&mut ctrl, "e");
        assert_eq!(doc.borrow().data(), &[0xFE, 0, 1]);
        assert_eq!(ctrl.get_cursor_position(), 1);
    }

    #[test]
    fn test_typing_at_end_appends() {
        let (doc, mut ctrl) = ctrl(2);
        ctrl.set_cursor_position(2, CursorState::Hex);

        type_str(&mut ctrl, "12");
        assert_eq!(doc.borrow().data(), &[0, 1, 0x12]);
        assert_eq!(ctrl.get_cursor_position(), 3);

        ctrl.set_cursor_position(3, CursorState::Ascii);
        type_str(&mut ctrl, "Hi");
        assert_eq!(doc.borrow().data(), &[0, 1, 0x12, b'H', b'i']);
    }

    #[test]
    fn test_ascii_overwrite_and_filter() {
        let (doc, mut ctrl) = ctrl(4);
        ctrl.set_cursor_position(1, CursorState::Ascii);

        type_str(&mut ctrl, "ok");
        assert_eq!(doc.borrow().data(), &[0, b'o', b'k', 3]);
        assert!(!press(&mut ctrl, Key::Char('\u{e9}')));
        assert!(!ctrl.on_key(KeyEvent::with_ctrl(Key::Char('c'))));
    }

    #[test]
    fn test_backspace_and_delete() {
        let (doc, mut ctrl) = ctrl(6);
        ctrl.set_cursor_position(3, CursorState::Hex);

        assert!(press(&mut ctrl, Key::Backspace));
        assert_eq!(doc.borrow().data(), &[0, 1, 3, 4, 5]);
        assert_eq!(ctrl.get_cursor_position(), 2);

        assert!(press(&mut ctrl, Key::Delete));
        assert_eq!(doc.borrow().data(), &[0, 1, 4, 5]);
        assert_eq!(ctrl.get_cursor_position(), 2);

        ctrl.set_selection(1, 2);
        assert!(press(&mut ctrl, Key::Delete));
        assert_eq!(doc.borrow().data(), &[0, 5]);
        assert_eq!(ctrl.get_cursor_position(), 1);
        assert!(!ctrl.has_selection());

        ctrl.set_cursor_position(0, CursorState::Hex);
        assert!(!press(&mut ctrl, Key::Backspace));
    }

    #[test]
    fn test_shift_arrows_extend_from_anchor() {
        let (_doc, mut ctrl) = ctrl(64);
        ctrl.set_cursor_position(26, CursorState::Hex);

        ctrl.on_key(KeyEvent::with_shift(Key::Right));
        ctrl.on_key(KeyEvent::with_shift(Key::Right));
        assert_eq!(ctrl.get_selection(), (26, 2));

        // Back past the anchor
        ctrl.on_key(KeyEvent::with_shift(Key::Up));
        assert_eq!(ctrl.get_cursor_position(), 12);
        assert_eq!(ctrl.get_selection(), (12, 14));

        press(&mut ctrl, Key::Right);
        assert!(!ctrl.has_selection());
        assert_eq!(ctrl.get_cursor_position(), 13);
    }

    #[test]
    fn test_home_end_keys() {
        let (_doc, mut ctrl) = ctrl(100);
        ctrl.set_cursor_position(37, CursorState::Hex);

        press(&mut ctrl, Key::Home);
        assert_eq!(ctrl.get_cursor_position(), 32);
        press(&mut ctrl, Key::End);
        assert_eq!(ctrl.get_cursor_position(), 47);

        ctrl.on_key(KeyEvent::with_ctrl(Key::End));
        assert_eq!(ctrl.get_cursor_position(), 100);
        ctrl.on_key(KeyEvent::with_ctrl(Key::Home));
        assert_eq!(ctrl.get_cursor_position(), 0);
    }

    #[test]
    fn test_tab_insert_escape() {
        let (_doc, mut ctrl) = ctrl(8);

        press(&mut ctrl, Key::Tab);
        assert_eq!(ctrl.get_cursor_state(), CursorState::Ascii);
        press(&mut ctrl, Key::Tab);
        assert_eq!(ctrl.get_cursor_state(), CursorState::Hex);

        press(&mut ctrl, Key::Insert);
        assert!(ctrl.get_insert_mode());

        ctrl.set_selection(0, 4);
        press(&mut ctrl, Key::Escape);
        assert!(!ctrl.has_selection());

        ctrl.set_show_ascii(false);
        assert!(!press(&mut ctrl, Key::Tab));
    }

    #[test]
    fn test_left_from_low_nibble() {
        let (_doc, mut ctrl) = ctrl(8);
        ctrl.set_cursor_position(3, CursorState::HexMid);

        press(&mut ctrl, Key::Left);
        assert_eq!(ctrl.get_cursor_position(), 3);
        assert_eq!(ctrl.get_cursor_state(), CursorState::Hex);
        press(&mut ctrl, Key::Left);
        assert_eq!(ctrl.get_cursor_position(), 2);
    }

    #[test]
    fn test_click_and_drag_selection() {
        let (_doc, mut ctrl) = ctrl(64);

        // Byte 1 of line 0, then drag to byte 2 of line 1
        ctrl.on_left_down(HEX_X + 2 * 8, 4, Modifiers::default());
        assert_eq!(ctrl.get_cursor_position(), 1);
        assert!(ctrl.is_selecting());
        assert!(!ctrl.has_selection());

        ctrl.on_motion(HEX_X + 4 * 8, 20);
        assert_eq!(ctrl.get_selection(), (1, 18));
        assert_eq!(ctrl.get_cursor_position(), 18);

        ctrl.on_left_up(HEX_X + 4 * 8, 20);
        assert!(!ctrl.is_selecting());

        // Shift-click extends from where the drag started
        ctrl.on_left_down(HEX_X + 4 * 8, 4, SHIFT);
        assert_eq!(ctrl.get_selection(), (1, 2));
    }

    #[test]
    fn test_shift_clicks_share_anchor() {
        let (_doc, mut ctrl) = ctrl(64);

        // Byte 10, then byte 20 (line 1 byte 4), then byte 5
        ctrl.on_left_down(HEX_X + 22 * 8, 4, Modifiers::default());
        ctrl.on_left_up(HEX_X + 22 * 8, 4);
        assert_eq!(ctrl.get_cursor_position(), 10);

        ctrl.on_left_down(HEX_X + 9 * 8, 20, SHIFT);
        ctrl.on_left_up(HEX_X + 9 * 8, 20);
        assert_eq!(ctrl.get_selection(), (10, 11));

        ctrl.on_left_down(HEX_X + 11 * 8, 4, SHIFT);
        ctrl.on_left_up(HEX_X + 11 * 8, 4);
        assert_eq!(ctrl.get_selection(), (5, 6));
        assert_eq!(ctrl.get_cursor_position(), 5);
    }

    #[test]
    fn test_shift_arrow_after_drag_keeps_start() {
        let (_doc, mut ctrl) = ctrl(64);

        ctrl.on_left_down(HEX_X + 2 * 8, 4, Modifiers::default());
        ctrl.on_left_up(HEX_X + 4 * 8, 20);
        assert_eq!(ctrl.get_selection(), (1, 18));

        ctrl.on_key(KeyEvent::with_shift(Key::Right));
        assert_eq!(ctrl.get_cursor_position(), 19);
        assert_eq!(ctrl.get_selection().0, 1);

        ctrl.on_key(KeyEvent::with_shift(Key::Right));
        assert_eq!(ctrl.get_selection(), (1, 19));

        // A plain click drops the old anchor
        ctrl.on_left_down(HEX_X + 6 * 8, 36, Modifiers::default());
        ctrl.on_left_up(HEX_X + 6 * 8, 36);
        assert!(!ctrl.has_selection());
        ctrl.on_key(KeyEvent::with_shift(Key::Left));
        assert_eq!(ctrl.get_selection(), (34, 1));
    }

    #[test]
    fn test_drag_keeps_starting_column() {
        let (_doc, mut ctrl) = ctrl(64);
        let ascii_x = HEX_X + (32 + 3 + 1) * 8;

        ctrl.on_left_down(ascii_x, 4, Modifiers::default());
        assert_eq!(ctrl.get_cursor_state(), CursorState::Ascii);
        assert_eq!(ctrl.get_cursor_position(), 0);

        // Dragging over the hex column still selects by ASCII column
        ctrl.on_motion(HEX_X + 8 * 8, 20);
        assert_eq!(ctrl.get_cursor_position(), 16);
        assert_eq!(ctrl.get_cursor_state(), CursorState::Ascii);
    }

    #[test]
    fn test_select_tick_scrolls_outside_view() {
        let (_doc, mut ctrl) = ctrl(16 * 100);

        ctrl.on_left_down(HEX_X, 4, Modifiers::default());
        assert!(!ctrl.on_select_tick());

        // Outside the view the selection stops at the last visible line
        ctrl.on_motion(HEX_X, 500);
        assert_eq!(ctrl.get_selection(), (0, 16 * 9 + 1));

        assert!(ctrl.on_select_tick());
        assert_eq!(ctrl.get_scroll_yoff(), 1);
        assert!(ctrl.on_select_tick());
        assert_eq!(ctrl.get_scroll_yoff(), 2);
        // Last visible line is now line 11
        assert_eq!(ctrl.get_cursor_position(), 16 * 11);
        assert_eq!(ctrl.get_selection(), (0, 16 * 11 + 1));

        ctrl.on_left_up(HEX_X, 500);
        assert!(!ctrl.on_select_tick());
    }

    #[test]
    fn test_comment_click_and_pointer() {
        let mut doc = MemoryDocument::new(vec![0; 32]);
        assert!(doc.set_comment(16, 8, "note"));
        let (_doc, mut ctrl) = ctrl_with(doc);

        // data 0..16 on line 0, comment on lines 1-2
        ctrl.on_left_down(40, 20, Modifiers::default());
        assert_eq!(
            ctrl.take_events(),
            vec![CtrlEvent::CommentClicked { offset: 16, length: 8 }]
        );
        assert_eq!(ctrl.pointer_hint_at(40, 20), PointerHint::Hand);
        assert_eq!(ctrl.pointer_hint_at(HEX_X, 4), PointerHint::Text);
        assert_eq!(ctrl.pointer_hint_at(HEX_X, 1000), PointerHint::Default);
    }

    #[test]
    fn test_right_click_keeps_selection() {
        let (_doc, mut ctrl) = ctrl(64);
        ctrl.set_selection(0, 8);

        ctrl.on_right_down(HEX_X + 2 * 8, 4);
        assert_eq!(ctrl.get_selection(), (0, 8));

        ctrl.on_right_down(HEX_X, 20);
        assert!(!ctrl.has_selection());
        assert_eq!(ctrl.get_cursor_position(), 16);
        assert_eq!(ctrl.take_events().last(), Some(&CtrlEvent::ContextMenu { offset: 16 }));
    }

    #[test]
    fn test_char_hook_runs_first() {
        use crate::editor::data_region::{DataRegion, DataRegionHooks};
        use crate::editor::region::{EditCtx, Region};

        #[derive(Default)]
        struct Upper;

        impl DataRegionHooks for Upper {
            fn on_char(&mut self, doc: &mut dyn Document, ctx: &EditCtx, ch: char) -> bool {
                ch == '!' && doc.overwrite_data(ctx.cursor_pos, &[0xFF]).is_ok()
            }
        }

        let (doc, mut ctrl) = ctrl(4);
        ctrl.set_region_builder(Box::new(|doc: &dyn Document| {
            vec![Box::new(DataRegion::<Upper>::new(0, doc.buffer_length())) as Box<dyn Region>]
        }));

        assert!(press(&mut ctrl, Key::Char('!')));
        assert_eq!(doc.borrow().data(), &[0xFF, 1, 2, 3]);
        assert_eq!(ctrl.take_events().last(), Some(&CtrlEvent::DataModified));

        type_str(&mut ctrl, "0");
        assert_eq!(doc.borrow().read_data(0, 1), vec![0x0F]);
    }
}
