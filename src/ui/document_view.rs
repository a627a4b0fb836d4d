//! egui widget hosting a document control

use std::time::{Duration, Instant};

use eframe::egui::{self, CursorIcon, FontId, Pos2, Rect, Sense, Stroke, TextStyle};

use super::egui_canvas::{EguiCanvas, EguiGlyphs};
use crate::document::{HighlightColour, SharedDocument};
use crate::editor::palette::{ColourIndex, NUM_HIGHLIGHTS};
use crate::editor::{
    CtrlEvent, DocumentCtrl, FontMetrics, Key, KeyEvent, Modifiers, PointerHint, ScrollAction,
    WheelAxis,
};

/// Interval between auto-scroll steps while a drag is held outside the view
const SELECT_TICK: Duration = Duration::from_millis(100);

/// Caret blink half-period
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Width of the vertical scrollbar strip
const SCROLLBAR_WIDTH: f32 = 12.0;

/// Shortest scrollbar thumb in pixels
const MIN_THUMB_HEIGHT: f32 = 16.0;

/// Height of the line-step arrow at each end of the scrollbar
const ARROW_HEIGHT: f32 = SCROLLBAR_WIDTH;

/// Things the view cannot do on its own and hands to its owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewRequest {
    /// Paste from the system clipboard at the cursor
    Paste,
    /// Set (`Some`) or clear (`None`) a highlight over a byte range
    Highlight {
        offset: u64,
        length: u64,
        colour: Option<HighlightColour>,
    },
    /// Attach a comment to a byte range
    Comment { offset: u64, length: u64, text: String },
}

/// Everything a frame of the view produced
#[derive(Default)]
pub struct ViewOutput {
    pub events: Vec<CtrlEvent>,
    pub requests: Vec<ViewRequest>,
}

/// State for the right-click menu
struct ContextMenuState {
    offset: u64,
    pos: Pos2,
    comment_draft: String,
}

pub struct DocumentView {
    ctrl: DocumentCtrl,
    font: FontId,
    glyphs: Option<EguiGlyphs>,
    last_select_tick: Instant,
    last_blink: Instant,
    context_menu: Option<ContextMenuState>,
}

impl DocumentView {
    pub fn new(doc: SharedDocument) -> Self {
        let now = Instant::now();
        Self {
            ctrl: DocumentCtrl::new(doc),
            font: FontId::monospace(14.0),
            glyphs: None,
            last_select_tick: now,
            last_blink: now,
            context_menu: None,
        }
    }

    pub fn ctrl(&self) -> &DocumentCtrl {
        &self.ctrl
    }

    pub fn ctrl_mut(&mut self) -> &mut DocumentCtrl {
        &mut self.ctrl
    }

    /// Drive the selection and blink timers
    ///
    /// Returns how long until the next timer is due, or `None` when neither
    /// timer is running.
    pub fn tick(&mut self, now: Instant, focused: bool) -> Option<Duration> {
        let mut wake: Option<Duration> = None;

        if self.ctrl.is_selecting() {
            if now.duration_since(self.last_select_tick) >= SELECT_TICK {
                self.ctrl.on_select_tick();
                self.last_select_tick = now;
            }
            wake = Some(SELECT_TICK.saturating_sub(now.duration_since(self.last_select_tick)));
        }

        if focused {
            if now.duration_since(self.last_blink) >= BLINK_INTERVAL {
                self.ctrl.on_redraw_cursor();
                self.last_blink = now;
            }
            let next = BLINK_INTERVAL.saturating_sub(now.duration_since(self.last_blink));
            wake = Some(wake.map_or(next, |w| w.min(next)));
        } else if !self.ctrl.get_cursor_visible() {
            self.ctrl.on_redraw_cursor();
        }

        wake
    }

    /// Pick up the monospace font of the current style
    fn update_font(&mut self, ui: &egui::Ui) {
        let font = TextStyle::Monospace.resolve(ui.style());
        let glyphs = EguiGlyphs::measure(ui.ctx(), &font);

        if self.glyphs != Some(glyphs) {
            log::debug!("Monospace font changed to {:?}", font);
            self.ctrl.set_font(FontMetrics::new(glyphs));
            self.glyphs = Some(glyphs);
        }
        self.font = font;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ViewOutput {
        let mut output = ViewOutput::default();

        self.update_font(ui);

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let text_rect = Rect::from_min_max(rect.min, egui::pos2(rect.max.x - SCROLLBAR_WIDTH, rect.max.y));
        let bar_rect = Rect::from_min_max(egui::pos2(text_rect.max.x, rect.min.y), rect.max);

        self.ctrl
            .resize(text_rect.width() as i32, text_rect.height() as i32);

        if response.has_focus() {
            ui.memory_mut(|m| {
                m.set_focus_lock_filter(
                    response.id,
                    egui::EventFilter {
                        tab: true,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: false,
                    },
                )
            });
        }

        self.handle_scrollbar(ui, &response, bar_rect);
        self.handle_events(ui, &response, text_rect, &mut output);
        self.handle_wheel(ui, &response);

        let now = Instant::now();
        if let Some(wake) = self.tick(now, response.has_focus()) {
            ui.ctx().request_repaint_after(wake);
        }

        if let Some(pos) = response.hover_pos().filter(|p| text_rect.contains(*p)) {
            let (x, y) = local(text_rect, pos);
            match self.ctrl.pointer_hint_at(x, y) {
                PointerHint::Text => ui.ctx().set_cursor_icon(CursorIcon::Text),
                PointerHint::Hand => ui.ctx().set_cursor_icon(CursorIcon::PointingHand),
                PointerHint::Default => {}
            }
        }

        let painter = ui.painter_at(text_rect);
        let mut canvas = EguiCanvas::new(&painter, text_rect.min, self.font.clone());
        self.ctrl.paint(&mut canvas);
        self.paint_scrollbar(ui, bar_rect);

        output.events.extend(self.ctrl.take_events());
        let menu_offset = output.events.iter().rev().find_map(|event| match event {
            CtrlEvent::ContextMenu { offset } => Some(*offset),
            _ => None,
        });
        if let Some(offset) = menu_offset {
            self.context_menu = Some(ContextMenuState {
                offset,
                pos: ui.input(|i| i.pointer.hover_pos()).unwrap_or(text_rect.min),
                comment_draft: String::new(),
            });
        }

        self.show_context_menu(ui, &mut output);

        output
    }

    fn handle_events(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        text_rect: Rect,
        output: &mut ViewOutput,
    ) {
        let focused = response.has_focus();
        let over_view = response.contains_pointer() && self.context_menu.is_none();
        let events = ui.input(|i| i.events.clone());

        for event in &events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let (x, y) = local(text_rect, *pos);
                    let inside = over_view && text_rect.contains(*pos);
                    match (button, pressed) {
                        (egui::PointerButton::Primary, true) if inside => {
                            response.request_focus();
                            self.ctrl.on_left_down(x, y, map_modifiers(*modifiers));
                        }
                        (egui::PointerButton::Primary, false) if self.ctrl.is_selecting() => {
                            self.ctrl.on_left_up(x, y);
                        }
                        (egui::PointerButton::Secondary, true) if inside => {
                            response.request_focus();
                            self.ctrl.on_right_down(x, y);
                        }
                        _ => {}
                    }
                }
                egui::Event::PointerMoved(pos) if self.ctrl.is_selecting() => {
                    let (x, y) = local(text_rect, *pos);
                    self.ctrl.on_motion(x, y);
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } if focused => {
                    if let Some(key) = map_key(*key) {
                        let handled = self.ctrl.on_key(KeyEvent {
                            key,
                            modifiers: map_modifiers(*modifiers),
                        });
                        if handled {
                            self.last_blink = Instant::now();
                        }
                    }
                }
                egui::Event::Text(text) if focused => {
                    for c in text.chars() {
                        self.ctrl.on_key(KeyEvent::new(Key::Char(c)));
                    }
                    self.last_blink = Instant::now();
                }
                egui::Event::Copy if focused => {
                    if let Some(text) = self.ctrl.copy_selection() {
                        ui.output_mut(|o| o.copied_text = text);
                    }
                }
                egui::Event::Cut if focused => {
                    if let Some(text) = self.ctrl.cut_selection() {
                        ui.output_mut(|o| o.copied_text = text);
                    }
                }
                egui::Event::Paste(text) if focused => {
                    self.ctrl.paste(text);
                }
                _ => {}
            }
        }

        output.events.extend(self.ctrl.take_events());
    }

    fn handle_wheel(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let delta = ui.input(|i| i.raw_scroll_delta);
        let layout = self.ctrl.layout();
        let (char_width, char_height) = (layout.char_width(), layout.char_height());

        if delta.y != 0.0 {
            self.ctrl
                .on_wheel(WheelAxis::Vertical, delta.y.round() as i32, char_height, 1);
        }
        if delta.x != 0.0 {
            self.ctrl
                .on_wheel(WheelAxis::Horizontal, delta.x.round() as i32, char_width, 1);
        }
    }

    /// Thumb rectangle inside the scrollbar track
    fn thumb_rect(&self, bar_rect: Rect) -> Rect {
        let track = track_rect(bar_rect);
        let thumb = self.ctrl.scrollbar_thumb();
        let total = (thumb.range + thumb.page).max(1) as f32;
        let height = (track.height() * thumb.page as f32 / total)
            .max(MIN_THUMB_HEIGHT)
            .min(track.height());
        let travel = track.height() - height;
        let top = if thumb.range > 0 {
            travel * thumb.position as f32 / thumb.range as f32
        } else {
            0.0
        };

        Rect::from_min_size(
            egui::pos2(track.min.x, track.min.y + top),
            egui::vec2(track.width(), height),
        )
    }

    fn handle_scrollbar(&mut self, ui: &egui::Ui, response: &egui::Response, bar_rect: Rect) {
        let bar = ui.interact(bar_rect, response.id.with("vscroll"), Sense::click_and_drag());
        let thumb_rect = self.thumb_rect(bar_rect);

        // Keys over the scrollbar scroll the view without moving the cursor
        if bar.hovered() {
            let action = ui.input_mut(|i| {
                SCROLLBAR_KEYS
                    .iter()
                    .find(|(key, _)| i.consume_key(egui::Modifiers::NONE, *key))
                    .map(|(_, action)| *action)
            });
            if let Some(action) = action {
                self.ctrl.on_scroll(action);
            }
        }

        let Some(pointer) = bar.interact_pointer_pos() else {
            return;
        };

        let track = track_rect(bar_rect);
        let from_track = ui
            .input(|i| i.pointer.press_origin())
            .is_some_and(|origin| track.contains(origin));
        if bar.dragged() && from_track {
            let travel = (track.height() - thumb_rect.height()).max(1.0);
            let fraction = ((pointer.y - track.min.y - thumb_rect.height() / 2.0) / travel).clamp(0.0, 1.0);
            let range = self.ctrl.scrollbar_thumb().range;
            self.ctrl
                .on_scroll(ScrollAction::ThumbTrack((fraction * range as f32).round() as i64));
        } else if bar.clicked() {
            if let Some(action) = click_action(bar_rect, thumb_rect, pointer.y) {
                self.ctrl.on_scroll(action);
            }
        }
    }

    fn paint_scrollbar(&self, ui: &egui::Ui, bar_rect: Rect) {
        let painter = ui.painter_at(bar_rect);
        let visuals = ui.visuals();
        let track = track_rect(bar_rect);
        let arrow_colour = visuals.widgets.inactive.fg_stroke.color;

        painter.rect_filled(bar_rect, 0.0, visuals.extreme_bg_color);
        painter.rect_filled(
            self.thumb_rect(bar_rect).shrink(2.0),
            3.0,
            visuals.widgets.inactive.bg_fill,
        );

        let up = Rect::from_min_max(bar_rect.min, egui::pos2(bar_rect.max.x, track.min.y));
        let down = Rect::from_min_max(egui::pos2(bar_rect.min.x, track.max.y), bar_rect.max);
        for (rect, pointing_up) in [(up, true), (down, false)] {
            let r = rect.shrink(3.0);
            let points = if pointing_up {
                vec![r.left_bottom(), r.center_top(), r.right_bottom()]
            } else {
                vec![r.left_top(), r.right_top(), r.center_bottom()]
            };
            painter.add(egui::Shape::convex_polygon(points, arrow_colour, Stroke::NONE));
        }
    }

    /// Show the context menu for the last right click
    fn show_context_menu(&mut self, ui: &egui::Ui, output: &mut ViewOutput) {
        let Some(menu) = &mut self.context_menu else {
            return;
        };

        let (sel_off, sel_len) = self.ctrl.get_selection();
        let (start, length) = if sel_len > 0 {
            (sel_off, sel_len)
        } else {
            (menu.offset, 1)
        };
        let label_suffix = if length > 1 {
            format!(" ({} bytes)", length)
        } else {
            String::new()
        };

        let palette = self.ctrl.palette().clone();
        let mut close_menu = false;
        let mut do_copy = false;
        let mut do_cut = false;

        let ctx = ui.ctx().clone();
        let area = egui::Area::new(ui.id().with("document_context_menu"))
            .fixed_pos(menu.pos)
            .order(egui::Order::Foreground)
            .show(&ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(160.0);

                    if ui
                        .add_enabled(sel_len > 0, egui::Button::new(format!("Copy{}", label_suffix)))
                        .clicked()
                    {
                        do_copy = true;
                        close_menu = true;
                    }
                    if ui
                        .add_enabled(sel_len > 0, egui::Button::new(format!("Cut{}", label_suffix)))
                        .clicked()
                    {
                        do_cut = true;
                        close_menu = true;
                    }
                    if ui.button("Paste").clicked() {
                        output.requests.push(ViewRequest::Paste);
                        close_menu = true;
                    }

                    ui.separator();

                    ui.label(format!("Highlight 0x{:X}{}", start, label_suffix));
                    ui.horizontal(|ui| {
                        for i in 0..NUM_HIGHLIGHTS {
                            let swatch = egui::Button::new("   ").fill(palette.get(ColourIndex::HighlightBg(i)));
                            if ui.add(swatch).clicked() {
                                output.requests.push(ViewRequest::Highlight {
                                    offset: start,
                                    length,
                                    colour: Some(HighlightColour(i)),
                                });
                                close_menu = true;
                            }
                        }
                    });
                    if ui.button("Remove Highlight").clicked() {
                        output.requests.push(ViewRequest::Highlight {
                            offset: start,
                            length,
                            colour: None,
                        });
                        close_menu = true;
                    }

                    ui.separator();

                    ui.horizontal(|ui| {
                        let edit = ui.add(
                            egui::TextEdit::singleline(&mut menu.comment_draft)
                                .hint_text("Comment")
                                .desired_width(120.0),
                        );
                        let submit = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if (ui.button("Add").clicked() || submit) && !menu.comment_draft.is_empty() {
                            output.requests.push(ViewRequest::Comment {
                                offset: start,
                                length,
                                text: std::mem::take(&mut menu.comment_draft),
                            });
                            close_menu = true;
                        }
                    });
                });
            });

        // Close on a click outside the menu or Escape
        let clicked_outside = ctx.input(|i| i.pointer.any_pressed())
            && !area.response.contains_pointer()
            && !ctx.input(|i| i.pointer.secondary_pressed());
        if clicked_outside || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            close_menu = true;
        }

        if do_copy {
            if let Some(text) = self.ctrl.copy_selection() {
                ctx.output_mut(|o| o.copied_text = text);
            }
        }
        if do_cut {
            if let Some(text) = self.ctrl.cut_selection() {
                ctx.output_mut(|o| o.copied_text = text);
            }
            output.events.extend(self.ctrl.take_events());
        }

        if close_menu {
            self.context_menu = None;
        }
    }
}

/// Keys that scroll the view while the pointer is over the scrollbar
const SCROLLBAR_KEYS: [(egui::Key, ScrollAction); 6] = [
    (egui::Key::ArrowUp, ScrollAction::LineUp),
    (egui::Key::ArrowDown, ScrollAction::LineDown),
    (egui::Key::PageUp, ScrollAction::PageUp),
    (egui::Key::PageDown, ScrollAction::PageDown),
    (egui::Key::Home, ScrollAction::Top),
    (egui::Key::End, ScrollAction::Bottom),
];

/// The scrollbar strip minus its two arrows
fn track_rect(bar_rect: Rect) -> Rect {
    let arrow = ARROW_HEIGHT.min(bar_rect.height() / 4.0);
    Rect::from_min_max(
        egui::pos2(bar_rect.min.x, bar_rect.min.y + arrow),
        egui::pos2(bar_rect.max.x, bar_rect.max.y - arrow),
    )
}

/// Scroll step for a click at `y` on the scrollbar; clicks on the thumb do nothing
fn click_action(bar_rect: Rect, thumb_rect: Rect, y: f32) -> Option<ScrollAction> {
    let track = track_rect(bar_rect);
    if y < track.min.y {
        Some(ScrollAction::LineUp)
    } else if y >= track.max.y {
        Some(ScrollAction::LineDown)
    } else if y < thumb_rect.min.y {
        Some(ScrollAction::PageUp)
    } else if y > thumb_rect.max.y {
        Some(ScrollAction::PageDown)
    } else {
        None
    }
}

/// Widget-relative integer coordinates of a screen position
fn local(rect: Rect, pos: Pos2) -> (i32, i32) {
    let v = pos - rect.min;
    (v.x.floor() as i32, v.y.floor() as i32)
}

fn map_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.command,
        alt: modifiers.alt,
    }
}

/// Keys the control handles itself; printable input arrives as text events
fn map_key(key: egui::Key) -> Option<Key> {
    Some(match key {
        egui::Key::ArrowLeft => Key::Left,
        egui::Key::ArrowRight => Key::Right,
        egui::Key::ArrowUp => Key::Up,
        egui::Key::ArrowDown => Key::Down,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::PageDown => Key::PageDown,
        egui::Key::Tab => Key::Tab,
        egui::Key::Insert => Key::Insert,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Delete => Key::Delete,
        egui::Key::Escape => Key::Escape,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn view(len: usize) -> DocumentView {
        let data = (0..len).map(|i| i as u8).collect();
        let doc: SharedDocument = Rc::new(RefCell::new(MemoryDocument::new(data)));
        let mut view = DocumentView::new(doc);
        view.ctrl_mut().set_bytes_per_line(16);
        view.ctrl_mut().resize(1024, 160);
        view
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(egui::Key::ArrowUp), Some(Key::Up));
        assert_eq!(map_key(egui::Key::Delete), Some(Key::Delete));
        assert_eq!(map_key(egui::Key::A), None);

        let mods = map_modifiers(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT);
        assert!(mods.ctrl && mods.shift && !mods.alt);
    }

    #[test]
    fn test_scrollbar_click_targets() {
        let mut view = view(16 * 100);
        let bar = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(12.0, 160.0));
        let track = track_rect(bar);
        assert_eq!((track.min.y, track.max.y), (12.0, 148.0));

        // Thumb sits at the top of the track
        let thumb = view.thumb_rect(bar);
        assert_eq!(thumb.min.y, 12.0);

        assert_eq!(click_action(bar, thumb, 5.0), Some(ScrollAction::LineUp));
        assert_eq!(click_action(bar, thumb, 150.0), Some(ScrollAction::LineDown));
        assert_eq!(click_action(bar, thumb, thumb.center().y), None);
        assert_eq!(click_action(bar, thumb, 140.0), Some(ScrollAction::PageDown));

        view.ctrl_mut().on_scroll(ScrollAction::Bottom);
        let thumb = view.thumb_rect(bar);
        assert_eq!(thumb.max.y, 148.0);
        assert_eq!(click_action(bar, thumb, 20.0), Some(ScrollAction::PageUp));
    }

    #[test]
    fn test_scrollbar_keys() {
        let mut view = view(16 * 100);

        for (key, action) in SCROLLBAR_KEYS {
            assert!(map_key(key).is_some());
            view.ctrl_mut().on_scroll(action);
        }
        // End was applied last
        assert_eq!(view.ctrl().get_scroll_yoff(), view.ctrl().get_scroll_yoff_max());
        // Scrolling alone leaves the cursor where it was
        assert_eq!(view.ctrl().get_cursor_position(), 0);
    }

    #[test]
    fn test_local_coordinates() {
        let rect = Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(100.0, 100.0));
        assert_eq!(local(rect, egui::pos2(15.7, 20.2)), (5, 0));
        assert_eq!(local(rect, egui::pos2(9.5, 0.0)), (-1, -20));
    }

    #[test]
    fn test_blink_only_while_focused() {
        let mut view = view(64);
        let start = Instant::now();

        let wake = view.tick(start + BLINK_INTERVAL, true);
        assert!(!view.ctrl().get_cursor_visible());
        assert_eq!(wake, Some(BLINK_INTERVAL));

        // Losing focus shows the caret again and stops the timer
        assert_eq!(view.tick(start + BLINK_INTERVAL * 2, false), None);
        assert!(view.ctrl().get_cursor_visible());
    }

    #[test]
    fn test_select_tick_scrolls_during_drag() {
        let mut view = view(16 * 100);
        let start = Instant::now();

        view.ctrl_mut().on_left_down(144, 0, Modifiers::default());
        view.ctrl_mut().on_motion(144, 400);
        assert_eq!(view.ctrl().get_scroll_yoff(), 0);

        view.tick(start + SELECT_TICK, false);
        assert_eq!(view.ctrl().get_scroll_yoff(), 1);

        // Not due yet
        view.tick(start + SELECT_TICK + Duration::from_millis(10), false);
        assert_eq!(view.ctrl().get_scroll_yoff(), 1);

        view.ctrl_mut().on_left_up(144, 400);
        assert_eq!(view.tick(start + SELECT_TICK * 3, false), None);
        assert_eq!(view.ctrl().get_scroll_yoff(), 1);
    }
}
