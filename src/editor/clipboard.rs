//! Copy, cut and paste of the selection as text

use std::rc::Rc;

use super::{CtrlEvent, DocumentCtrl};
use crate::document::CursorState;

/// Parse hex digit pairs, ignoring whitespace between them
///
/// Returns `None` on any other character or an odd number of digits.
pub fn parse_hex_input(input: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;

    if digits.len() % 2 != 0 {
        return None;
    }

    Some(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// Bytes of `text` with one byte per character, if every character fits
fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

impl DocumentCtrl {
    /// Text for the current selection, or `None` when nothing is selected
    ///
    /// A selection inside a single data region is offered to that region
    /// first. Otherwise the bytes are copied as text from the ASCII column
    /// and as hex digits from the hex column.
    pub fn copy_selection(&self) -> Option<String> {
        let (off, len) = self.get_selection();
        if len == 0 {
            return None;
        }

        let doc = self.doc.borrow();
        let ctx = self.edit_ctx();

        if let Some(region) = self.data_region_by_offset(off) {
            if off + len <= region.d_end() {
                if let Some(text) = region.on_copy(&*doc, &ctx) {
                    return Some(text);
                }
            }
        }

        let data = doc.read_data(off, len);
        Some(if self.cursor_state == CursorState::Ascii {
            data.iter().map(|&b| b as char).collect()
        } else {
            hex_string(&data)
        })
    }

    /// Copy the selection, then erase it
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.copy_selection()?;
        let (off, len) = self.get_selection();

        if !self.edit_document(|doc| doc.erase_data(off, len)) {
            return None;
        }
        self.clear_selection();
        self.set_cursor_position(off, CursorState::Goto);

        Some(text)
    }

    /// Paste text at the selection or cursor; returns whether anything changed
    pub fn paste(&mut self, text: &str) -> bool {
        let (sel_off, sel_len) = self.get_selection();
        let target = if sel_len > 0 { sel_off } else { self.cpos_off };
        let ctx = self.edit_ctx();

        let handled = {
            let doc = Rc::clone(&self.doc);
            let mut doc = doc.borrow_mut();
            match self.data_region_by_offset_mut(target) {
                Some(region) => region.on_paste(&mut *doc, &ctx, text),
                None => false,
            }
        };
        if handled {
            self.events.push(CtrlEvent::DataModified);
            self.refresh_regions();
            return true;
        }

        let data = if self.cursor_state == CursorState::Ascii {
            latin1_bytes(text)
        } else {
            parse_hex_input(text)
        };
        let Some(data) = data.filter(|d| !d.is_empty()) else {
            log::debug!("Nothing pasteable in {} characters of clipboard text", text.chars().count());
            return false;
        };

        let buffer_length = self.buffer_length();
        let insert = self.insert_mode || target >= buffer_length;

        let (ok, end) = if insert {
            let ok = self.edit_document(|doc| {
                if sel_len > 0 {
                    doc.erase_data(sel_off, sel_len)?;
                }
                doc.insert_data(target, &data)
            });
            (ok, target + data.len() as u64)
        } else {
            // Overwriting never grows the document
            let n = (data.len() as u64).min(buffer_length - target) as usize;
            let ok = self.edit_document(|doc| doc.overwrite_data(target, &data[..n]));
            (ok, target + n as u64)
        };

        if ok {
            self.clear_selection();
            self.set_cursor_position(end, CursorState::Goto);
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, MemoryDocument};
    use crate::editor::data_region::{DataRegion, DataRegionHooks};
    use crate::editor::region::{EditCtx, Region};
    use crate::editor::tests::{ctrl, ctrl_with};

    #[test]
    fn test_parse_hex_input() {
        assert_eq!(parse_hex_input("DEADbeef"), Some(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(parse_hex_input(" 01 02\n0A\t"), Some(vec![0x01, 0x02, 0x0A]));
        assert_eq!(parse_hex_input("123"), None);
        assert_eq!(parse_hex_input("12,34"), None);
        assert_eq!(parse_hex_input("0x12"), None);
        assert_eq!(parse_hex_input(""), Some(vec![]));
    }

    #[test]
    fn test_copy_hex_and_ascii() {
        let (_doc, mut ctrl) = ctrl_with(MemoryDocument::new(b"\x00Hello\xff".to_vec()));
        assert_eq!(ctrl.copy_selection(), None);

        ctrl.set_selection(1, 5);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("48656C6C6F"));

        ctrl.set_cursor_position(1, CursorState::Ascii);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("Hello"));

        ctrl.set_selection(5, 2);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("o\u{ff}"));
    }

    #[derive(Default)]
    struct TaggedCopy;

    impl DataRegionHooks for TaggedCopy {
        fn on_copy(&self, _doc: &dyn Document, ctx: &EditCtx) -> Option<String> {
            Some(format!("tagged:{}+{}", ctx.selection_off, ctx.selection_length))
        }

        fn on_paste(&mut self, doc: &mut dyn Document, ctx: &EditCtx, text: &str) -> bool {
            text == "zero" && doc.overwrite_data(ctx.cursor_pos, &[0]).is_ok()
        }
    }

    fn tagged_halves(ctrl: &mut DocumentCtrl) {
        ctrl.set_region_builder(Box::new(|doc: &dyn Document| {
            let half = doc.buffer_length() / 2;
            vec![
                Box::new(DataRegion::<TaggedCopy>::new(0, half)) as Box<dyn Region>,
                Box::new(DataRegion::<TaggedCopy>::new(half, doc.buffer_length() - half)),
            ]
        }));
    }

    #[test]
    fn test_copy_hook_only_inside_one_region() {
        let (_doc, mut ctrl) = ctrl(32);
        tagged_halves(&mut ctrl);

        ctrl.set_selection(2, 4);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("tagged:2+4"));

        ctrl.set_selection(16, 16);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("tagged:16+16"));

        // Spanning both regions falls back to plain hex
        ctrl.set_selection(14, 4);
        assert_eq!(ctrl.copy_selection().as_deref(), Some("0E0F1011"));
    }

    #[test]
    fn test_paste_hook_runs_first() {
        let (doc, mut ctrl) = ctrl(32);
        tagged_halves(&mut ctrl);
        ctrl.set_cursor_position(20, CursorState::Hex);

        assert!(ctrl.paste("zero"));
        assert_eq!(doc.borrow().read_data(20, 1), vec![0]);

        assert!(ctrl.paste("FFFF"));
        assert_eq!(doc.borrow().read_data(20, 3), vec![0xFF, 0xFF, 22]);
        assert_eq!(ctrl.get_cursor_position(), 22);
    }

    #[test]
    fn test_paste_overwrite_is_clamped() {
        let (doc, mut ctrl) = ctrl(4);
        ctrl.set_cursor_position(2, CursorState::Hex);

        assert!(ctrl.paste("AA BB CC"));
        assert_eq!(doc.borrow().data(), &[0, 1, 0xAA, 0xBB]);
        assert_eq!(ctrl.get_cursor_position(), 4);

        // At the end there is nothing to overwrite, so the data is appended
        assert!(ctrl.paste("CC"));
        assert_eq!(doc.borrow().data(), &[0, 1, 0xAA, 0xBB, 0xCC]);
        assert!(!ctrl.paste("C"));
    }

    #[test]
    fn test_paste_replaces_selection_in_insert_mode() {
        let (doc, mut ctrl) = ctrl(6);
        ctrl.set_insert_mode(true);
        ctrl.set_selection(1, 3);

        assert!(ctrl.paste("EEEE"));
        assert_eq!(doc.borrow().data(), &[0, 0xEE, 0xEE, 4, 5]);
        assert_eq!(ctrl.get_cursor_position(), 3);
        assert!(!ctrl.has_selection());
    }

    #[test]
    fn test_paste_overwrites_selection_start() {
        let (doc, mut ctrl) = ctrl(6);
        ctrl.set_selection(1, 3);

        assert!(ctrl.paste("EE"));
        assert_eq!(doc.borrow().data(), &[0, 0xEE, 2, 3, 4, 5]);
        assert_eq!(ctrl.get_cursor_position(), 2);
    }

    #[test]
    fn test_paste_ascii() {
        let (doc, mut ctrl) = ctrl(4);
        ctrl.set_cursor_position(0, CursorState::Ascii);

        assert!(ctrl.paste("ab"));
        assert_eq!(doc.borrow().data(), &[b'a', b'b', 2, 3]);
        assert!(!ctrl.paste("\u{263a}"));
    }

    #[test]
    fn test_cut() {
        let (doc, mut ctrl) = ctrl(8);
        ctrl.set_selection(2, 3);

        assert_eq!(ctrl.cut_selection().as_deref(), Some("020304"));
        assert_eq!(doc.borrow().data(), &[0, 1, 5, 6, 7]);
        assert_eq!(ctrl.get_cursor_position(), 2);
        assert_eq!(ctrl.cut_selection(), None);
    }
}
