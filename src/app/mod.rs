//! Main application state and egui integration

mod input;
mod menu_bar;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::document::{CursorState, Document, MemoryDocument, SharedDocument};
use crate::editor::CtrlEvent;
use crate::settings::AppSettings;
use crate::ui::{DocumentView, ViewOutput, ViewRequest};

/// Threshold for detecting window size changes (pixels)
const WINDOW_RESIZE_THRESHOLD: f32 = 1.0;

/// Debounce delay for window resize saves (milliseconds)
const WINDOW_RESIZE_DEBOUNCE_MS: u64 = 500;

/// An open file and the views onto it
///
/// Both views share the same document. The second view, when shown, is
/// scroll-linked to the first so the two always show the same lines.
pub struct OpenDocument {
    pub path: PathBuf,
    pub doc: Rc<RefCell<MemoryDocument>>,
    pub primary: DocumentView,
    pub secondary: Option<DocumentView>,
    /// Which view last received input
    pub focused_secondary: bool,
}

impl OpenDocument {
    fn new(path: PathBuf, data: Vec<u8>, settings: &AppSettings) -> Self {
        let doc = Rc::new(RefCell::new(MemoryDocument::new(data)));
        let shared: SharedDocument = doc.clone();

        let mut primary = DocumentView::new(shared);
        settings.view.apply(primary.ctrl_mut());

        let mut open = Self {
            path,
            doc,
            primary,
            secondary: None,
            focused_secondary: false,
        };
        open.set_split(settings.view.split_view, settings);
        open
    }

    /// Show or hide the scroll-linked second view
    pub fn set_split(&mut self, split: bool, settings: &AppSettings) {
        if split == self.secondary.is_some() {
            return;
        }

        if split {
            let shared: SharedDocument = self.doc.clone();
            let mut view = DocumentView::new(shared);
            settings.view.apply(view.ctrl_mut());
            // The second view starts in the text column
            let pos = self.primary.ctrl().get_cursor_position();
            view.ctrl_mut().set_cursor_position(pos, CursorState::Ascii);
            view.ctrl_mut()
                .linked_scroll_insert_self_after(self.primary.ctrl());
            view.ctrl_mut().take_events();
            self.secondary = Some(view);
        } else {
            // Dropping the view unlinks it
            self.secondary = None;
            self.focused_secondary = false;
        }
    }

    pub fn active_view(&self) -> &DocumentView {
        match (&self.secondary, self.focused_secondary) {
            (Some(view), true) => view,
            _ => &self.primary,
        }
    }

    pub fn active_view_mut(&mut self) -> &mut DocumentView {
        match (&mut self.secondary, self.focused_secondary) {
            (Some(view), true) => view,
            _ => &mut self.primary,
        }
    }

    /// Apply every view option from `settings` to all views
    pub fn apply_settings(&mut self, settings: &AppSettings) {
        settings.view.apply(self.primary.ctrl_mut());
        if let Some(view) = &mut self.secondary {
            settings.view.apply(view.ctrl_mut());
        }
        self.set_split(settings.view.split_view, settings);
    }

    /// Rebuild the regions of every view after the document changed
    pub fn refresh_all(&mut self) {
        self.primary.ctrl_mut().refresh_regions();
        if let Some(view) = &mut self.secondary {
            view.ctrl_mut().refresh_regions();
        }
    }
}

/// Whether input currently goes to the second view
fn open_is_secondary(open: &Option<OpenDocument>) -> bool {
    open.as_ref()
        .is_some_and(|o| o.focused_secondary && o.secondary.is_some())
}

/// Main application state for hexctrl
#[derive(Default)]
pub struct HexApp {
    /// The open file, if any
    pub open: Option<OpenDocument>,

    /// Application settings (persisted to disk)
    pub settings: AppSettings,

    /// Text shown at the end of the status bar
    pub status: Option<String>,

    /// Pending file path to open (for deferred actions from menus)
    pub(super) pending_open_path: Option<PathBuf>,

    /// System clipboard, opened on first use
    clipboard: Option<arboard::Clipboard>,

    /// Last known window size (for change detection)
    last_window_size: Option<egui::Vec2>,

    /// Timer for debouncing window resize saves
    window_resize_timer: Option<Instant>,
}

impl HexApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Open a file from a path
    pub fn open_file(&mut self, path: PathBuf) {
        match std::fs::read(&path) {
            Ok(bytes) => {
                log::info!("Loaded file: {} ({} bytes)", path.display(), bytes.len());
                self.open = Some(OpenDocument::new(path.clone(), bytes, &self.settings));
                self.status = None;
                self.settings.add_recent_file(path);
                self.settings.save();
            }
            Err(e) => {
                log::error!("Failed to load file: {}", e);
                self.status = Some(format!("Failed to load file: {}", e));
            }
        }
    }

    /// Open file dialog and load selected file
    pub fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.open_file(path);
        }
    }

    /// Write the document back to the file it came from
    pub fn save_file(&mut self) {
        let Some(open) = &self.open else {
            return;
        };

        let result = std::fs::write(&open.path, open.doc.borrow().data());
        match result {
            Ok(()) => {
                log::info!("Saved {}", open.path.display());
                open.doc.borrow_mut().mark_saved();
                self.status = Some(format!("Saved {}", open.path.display()));
            }
            Err(e) => {
                log::error!("Failed to save: {}", e);
                self.status = Some(format!("Failed to save: {}", e));
            }
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.open.as_ref().is_some_and(|o| o.doc.borrow().is_modified())
    }

    /// Re-apply the view settings to the open views and persist them
    pub fn view_settings_changed(&mut self) {
        if let Some(open) = &mut self.open {
            open.apply_settings(&self.settings);
        }
        self.settings.save();
    }

    fn clipboard_text(&mut self) -> Option<String> {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    log::warn!("System clipboard unavailable: {}", e);
                    return None;
                }
            }
        }

        match self.clipboard.as_mut()?.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("No text on the clipboard: {}", e);
                None
            }
        }
    }

    /// Copy (or cut) the active view's selection through egui's clipboard output
    pub fn copy_selection(&mut self, ctx: &egui::Context, cut: bool) {
        let Some(open) = &mut self.open else {
            return;
        };

        let ctrl = open.active_view_mut().ctrl_mut();
        let text = if cut {
            ctrl.cut_selection()
        } else {
            ctrl.copy_selection()
        };
        let events = ctrl.take_events();

        if let Some(text) = text {
            ctx.output_mut(|o| o.copied_text = text);
        }
        self.process_events(&events, open_is_secondary(&self.open));
    }

    /// Paste the system clipboard into the active view
    pub fn paste_from_clipboard(&mut self) {
        let Some(text) = self.clipboard_text() else {
            return;
        };
        if let Some(open) = &mut self.open {
            let view = open.active_view_mut();
            if view.ctrl_mut().paste(&text) {
                let events = view.ctrl_mut().take_events();
                self.process_events(&events, open_is_secondary(&self.open));
            }
        }
    }

    /// React to what a view reported this frame
    fn process_output(&mut self, output: ViewOutput, from_secondary: bool) {
        let focus_changed = output
            .events
            .iter()
            .any(|e| matches!(e, CtrlEvent::CursorMoved { .. } | CtrlEvent::ContextMenu { .. }));
        if focus_changed {
            if let Some(open) = &mut self.open {
                open.focused_secondary = from_secondary && open.secondary.is_some();
            }
        }

        self.process_events(&output.events, from_secondary);

        for request in output.requests {
            self.process_request(request);
        }
    }

    fn process_events(&mut self, events: &[CtrlEvent], from_secondary: bool) {
        for event in events {
            match event {
                CtrlEvent::DataModified => {
                    // The view that made the edit already rebuilt its regions
                    if let Some(open) = &mut self.open {
                        let other = if from_secondary {
                            Some(&mut open.primary)
                        } else {
                            open.secondary.as_mut()
                        };
                        if let Some(view) = other {
                            view.ctrl_mut().refresh_regions();
                        }
                    }
                }
                CtrlEvent::CommentClicked { offset, length } => {
                    let text = self.open.as_ref().and_then(|o| {
                        o.doc
                            .borrow()
                            .comments()
                            .get(*offset, *length)
                            .cloned()
                    });
                    self.status = text.map(|t| format!("Comment at 0x{:X}: {}", offset, t));
                }
                _ => {}
            }
        }
    }

    fn process_request(&mut self, request: ViewRequest) {
        match request {
            ViewRequest::Paste => self.paste_from_clipboard(),
            ViewRequest::Highlight {
                offset,
                length,
                colour,
            } => {
                let Some(open) = &self.open else { return };
                let mut doc = open.doc.borrow_mut();
                let applied = match colour {
                    Some(colour) => doc.set_highlight(offset, length, colour),
                    None => doc.remove_highlight(offset, length).is_some(),
                };
                if !applied {
                    log::warn!("Highlight 0x{:X}+{} overlaps another highlight", offset, length);
                    self.status = Some("Highlights must nest inside each other".to_string());
                }
            }
            ViewRequest::Comment {
                offset,
                length,
                text,
            } => {
                let Some(open) = &mut self.open else { return };
                let applied = open.doc.borrow_mut().set_comment(offset, length, text);
                if applied {
                    open.refresh_all();
                } else {
                    log::warn!("Comment 0x{:X}+{} overlaps another comment", offset, length);
                    self.status = Some("Comments must nest inside each other".to_string());
                }
            }
        }
    }

    /// Render the status bar
    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.has_unsaved_changes() {
                    ui.colored_label(egui::Color32::from_rgb(255, 180, 0), "\u{25CF} Modified");
                    ui.separator();
                }
                if let Some(open) = &self.open {
                    let ctrl = open.active_view().ctrl();
                    ui.label(format!("File: {}", open.path.display()));
                    ui.separator();
                    ui.label(format!("{} bytes", ctrl.buffer_length()));
                    ui.separator();
                    ui.label(format!("Cursor: 0x{:08X}", ctrl.get_cursor_position()));
                    let (off, len) = ctrl.get_selection();
                    if len > 0 {
                        ui.separator();
                        ui.label(format!("Selection: 0x{:X}+{}", off, len));
                    }
                    ui.separator();
                    let mode_text = match ctrl.get_cursor_state() {
                        CursorState::Ascii => "ASCII",
                        _ => "HEX",
                    };
                    ui.label(format!("Mode: {}", mode_text));
                    ui.separator();
                    ui.label(if ctrl.get_insert_mode() { "INS" } else { "OVR" });
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, status);
                }
            });
        });
    }

    /// Render the document views, side by side when split
    fn render_main_content(&mut self, ctx: &egui::Context) {
        let mut outputs: Vec<(ViewOutput, bool)> = Vec::new();
        let mut open_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| match &mut self.open {
            Some(open) => match &mut open.secondary {
                Some(secondary) => {
                    ui.columns(2, |columns| {
                        outputs.push((open.primary.show(&mut columns[0]), false));
                        outputs.push((secondary.show(&mut columns[1]), true));
                    });
                }
                None => outputs.push((open.primary.show(ui), false)),
            },
            None => {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("hexctrl");
                        ui.add_space(20.0);
                        ui.label("Drag and drop a file here, or use File > Open");
                        ui.add_space(20.0);
                        if ui.button("Open File...").clicked() {
                            open_clicked = true;
                        }
                    });
                });
            }
        });

        for (output, from_secondary) in outputs {
            self.process_output(output, from_secondary);
        }
        if open_clicked {
            self.open_file_dialog();
        }
    }

    /// Track window size changes and save them once resizing settles
    fn track_window_size(&mut self, ctx: &egui::Context) {
        let current_size = ctx.screen_rect().size();
        if let Some(last_size) = self.last_window_size {
            if (current_size.x - last_size.x).abs() > WINDOW_RESIZE_THRESHOLD
                || (current_size.y - last_size.y).abs() > WINDOW_RESIZE_THRESHOLD
            {
                self.window_resize_timer = Some(Instant::now());
                self.last_window_size = Some(current_size);
            }
        } else {
            self.last_window_size = Some(current_size);
        }

        if let Some(timer) = self.window_resize_timer {
            if timer.elapsed() > Duration::from_millis(WINDOW_RESIZE_DEBOUNCE_MS) {
                self.settings.window_width = current_size.x;
                self.settings.window_height = current_size.y;
                self.settings.save();
                self.window_resize_timer = None;
            }
        }
    }
}

impl eframe::App for HexApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.track_window_size(ctx);

        // Handle deferred file opening from recent files menu
        if let Some(path) = self.pending_open_path.take() {
            self.open_file(path);
        }

        let input_actions = self.handle_input(ctx);
        self.process_input_actions(input_actions);

        self.render_menu_bar(ctx);
        self.render_status_bar(ctx);
        self.render_main_content(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::GenericDataRegion;

    fn open_doc(len: usize, split: bool) -> OpenDocument {
        let mut settings = AppSettings::default();
        settings.view.bytes_per_line = 16;
        settings.view.split_view = split;
        let data = (0..len).map(|i| i as u8).collect();

        let mut open = OpenDocument::new(PathBuf::from("/tmp/test.bin"), data, &settings);
        open.primary.ctrl_mut().resize(1024, 160);
        if let Some(view) = &mut open.secondary {
            view.ctrl_mut().resize(1024, 160);
        }
        open
    }

    #[test]
    fn test_split_views_scroll_together() {
        let mut open = open_doc(16 * 100, true);
        let secondary = open.secondary.as_mut().unwrap();
        assert!(secondary.ctrl().is_scroll_linked());

        open.primary.ctrl_mut().set_scroll_yoff(30);
        assert_eq!(open.secondary.as_ref().unwrap().ctrl().get_scroll_yoff(), 30);

        open.secondary.as_mut().unwrap().ctrl_mut().set_scroll_yoff(12);
        assert_eq!(open.primary.ctrl().get_scroll_yoff(), 12);
    }

    #[test]
    fn test_unsplit_unlinks_primary() {
        let settings = AppSettings::default();
        let mut open = open_doc(64, true);
        assert!(open.primary.ctrl().is_scroll_linked());

        open.set_split(false, &settings);
        assert!(open.secondary.is_none());
        assert!(!open.primary.ctrl().is_scroll_linked());
    }

    #[test]
    fn test_edit_in_one_view_refreshes_other() {
        let mut app = HexApp {
            open: Some(open_doc(32, true)),
            ..Default::default()
        };

        let open = app.open.as_mut().unwrap();
        assert!(open
            .primary
            .ctrl_mut()
            .edit_document(|doc| doc.erase_data(0, 16)));
        let events = open.primary.ctrl_mut().take_events();
        app.process_events(&events, false);

        let open = app.open.as_ref().unwrap();
        let secondary = open.secondary.as_ref().unwrap().ctrl();
        assert_eq!(open.doc.borrow().buffer_length(), 16);
        assert_eq!(secondary.data_region_by_offset(0).map(|r| r.d_length()), Some(16));
    }

    #[test]
    fn test_comment_request_rebuilds_regions() {
        let mut app = HexApp {
            open: Some(open_doc(32, false)),
            ..Default::default()
        };

        app.process_request(ViewRequest::Comment {
            offset: 4,
            length: 8,
            text: "header".to_string(),
        });
        let regions = app.open.as_ref().unwrap().primary.ctrl().regions().len();
        assert!(regions > 1);

        app.process_events(&[CtrlEvent::CommentClicked { offset: 4, length: 8 }], false);
        assert_eq!(app.status.as_deref(), Some("Comment at 0x4: header"));
    }

    #[test]
    fn test_overlapping_highlight_reported() {
        let mut app = HexApp {
            open: Some(open_doc(32, false)),
            ..Default::default()
        };

        app.process_request(ViewRequest::Highlight {
            offset: 0,
            length: 8,
            colour: Some(crate::document::HighlightColour(1)),
        });
        assert!(app.status.is_none());

        app.process_request(ViewRequest::Highlight {
            offset: 4,
            length: 8,
            colour: Some(crate::document::HighlightColour(2)),
        });
        assert!(app.status.is_some());
    }
}
