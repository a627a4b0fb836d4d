use eframe::egui;

use super::HexApp;
use crate::editor::{InlineCommentMode, OffsetBase, BYTES_PER_LINE_FIT_BYTES, BYTES_PER_LINE_FIT_GROUPS};

/// Returns the platform-appropriate modifier key text for shortcuts
fn modifier_key() -> &'static str {
    if cfg!(target_os = "macos") {
        "⌘ " // space to give the character that follows more breathing room
    } else {
        "Ctrl+"
    }
}

/// Menu item with shortcut hint that has better contrast than egui's default.
/// Uses a horizontal layout with the shortcut text aligned right.
/// Shortcut text is dimmer when not hovered, brighter when hovered.
fn menu_item_with_shortcut(ui: &mut egui::Ui, label: &str, shortcut: &str, enabled: bool) -> bool {
    // Calculate label and shortcut widths for proper sizing
    let label_galley = ui.painter().layout_no_wrap(
        label.to_string(),
        egui::FontId::default(),
        egui::Color32::WHITE,
    );
    let shortcut_galley = ui.painter().layout_no_wrap(
        shortcut.to_string(),
        egui::FontId::default(),
        egui::Color32::WHITE,
    );

    // Width = label + gap + shortcut + padding
    let desired_width = label_galley.size().x + 40.0 + shortcut_galley.size().x + 8.0;

    let response = ui.add_enabled(
        enabled,
        egui::Button::new(label).min_size(egui::vec2(desired_width, 0.0)),
    );

    // Paint shortcut with brightness based on hover state
    if !shortcut.is_empty() {
        let shortcut_color = if response.hovered() {
            egui::Color32::from_gray(200) // Brighter when hovered
        } else {
            egui::Color32::from_gray(120) // Dimmer when not hovered
        };

        let shortcut_galley = ui.painter().layout_no_wrap(
            shortcut.to_string(),
            egui::FontId::default(),
            shortcut_color,
        );

        let pos = egui::pos2(
            response.rect.right() - shortcut_galley.size().x - 8.0,
            response.rect.center().y - shortcut_galley.size().y / 2.0,
        );
        ui.painter().galley(pos, shortcut_galley, shortcut_color);
    }

    response.clicked()
}

/// Radio entries for one view option; returns whether the choice changed
fn radio_choices<T: Copy + PartialEq>(ui: &mut egui::Ui, value: &mut T, choices: &[(T, &str)]) -> bool {
    let mut changed = false;
    for &(choice, label) in choices {
        if ui.radio_value(value, choice, label).changed() {
            changed = true;
        }
    }
    changed
}

impl HexApp {
    /// Render the top menu bar
    pub(super) fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| self.render_file_menu(ui, ctx));
                ui.menu_button("Edit", |ui| self.render_edit_menu(ui));
                ui.menu_button("View", |ui| self.render_view_menu(ui));
            });
        });
    }

    /// Render the File menu contents
    fn render_file_menu(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mod_str = modifier_key();
        let open_shortcut = format!("{}O", mod_str);
        let save_shortcut = format!("{}S", mod_str);

        if menu_item_with_shortcut(ui, "Open...", &open_shortcut, true) {
            self.open_file_dialog();
            ui.close_menu();
        }
        if menu_item_with_shortcut(ui, "Save", &save_shortcut, self.has_unsaved_changes()) {
            self.save_file();
            ui.close_menu();
        }
        ui.separator();

        // Recent files submenu
        let recent_files = self.settings.recent_files().to_vec();
        ui.menu_button("Recent Files", |ui| {
            if recent_files.is_empty() {
                ui.label("No recent files");
                return;
            }

            for path in &recent_files {
                let display_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());

                if ui
                    .button(&display_name)
                    .on_hover_text(path.to_string_lossy())
                    .clicked()
                {
                    self.pending_open_path = Some(path.clone());
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Clear Recent Files").clicked() {
                self.settings.clear_recent_files();
                self.settings.save();
                ui.close_menu();
            }
        });

        ui.separator();
        if ui.button("Exit").clicked() {
            self.settings.save();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            ui.close_menu();
        }
    }

    /// Render the Edit menu contents
    fn render_edit_menu(&mut self, ui: &mut egui::Ui) {
        let mod_str = modifier_key();
        let has_selection = self
            .open
            .as_ref()
            .is_some_and(|o| o.active_view().ctrl().has_selection());
        let has_file = self.open.is_some();

        if menu_item_with_shortcut(ui, "Copy", &format!("{}C", mod_str), has_selection) {
            self.copy_selection(ui.ctx(), false);
            ui.close_menu();
        }
        if menu_item_with_shortcut(ui, "Cut", &format!("{}X", mod_str), has_selection) {
            self.copy_selection(ui.ctx(), true);
            ui.close_menu();
        }
        if menu_item_with_shortcut(ui, "Paste", &format!("{}V", mod_str), has_file) {
            self.paste_from_clipboard();
            ui.close_menu();
        }
        ui.separator();

        let mut insert = self
            .open
            .as_ref()
            .is_some_and(|o| o.active_view().ctrl().get_insert_mode());
        if ui
            .add_enabled(has_file, egui::Checkbox::new(&mut insert, "Insert Mode"))
            .changed()
        {
            if let Some(open) = &mut self.open {
                open.active_view_mut().ctrl_mut().set_insert_mode(insert);
            }
        }
    }

    /// Render the View menu contents
    fn render_view_menu(&mut self, ui: &mut egui::Ui) {
        let view = &mut self.settings.view;
        let mut changed = false;

        ui.menu_button("Bytes per Line", |ui| {
            changed |= radio_choices(
                ui,
                &mut view.bytes_per_line,
                &[
                    (BYTES_PER_LINE_FIT_GROUPS, "Fit whole groups"),
                    (BYTES_PER_LINE_FIT_BYTES, "Fit whole bytes"),
                    (8, "8"),
                    (16, "16"),
                    (32, "32"),
                    (64, "64"),
                ],
            );
        });
        ui.menu_button("Bytes per Group", |ui| {
            changed |= radio_choices(
                ui,
                &mut view.bytes_per_group,
                &[(1, "1"), (2, "2"), (4, "4"), (8, "8"), (16, "16")],
            );
        });
        ui.menu_button("Offsets", |ui| {
            changed |= ui.checkbox(&mut view.show_offsets, "Show Offsets").changed();
            ui.separator();
            changed |= radio_choices(
                ui,
                &mut view.offset_base,
                &[
                    (OffsetBase::Hex, "Hexadecimal"),
                    (OffsetBase::Decimal, "Decimal"),
                    (OffsetBase::Octal, "Octal"),
                ],
            );
        });
        ui.menu_button("Inline Comments", |ui| {
            changed |= radio_choices(
                ui,
                &mut view.inline_comment_mode,
                &[
                    (InlineCommentMode::Hidden, "Hidden"),
                    (InlineCommentMode::Short, "Short"),
                    (InlineCommentMode::Full, "Full"),
                    (InlineCommentMode::ShortIndent, "Short, indented"),
                    (InlineCommentMode::FullIndent, "Full, indented"),
                ],
            );
        });
        ui.separator();

        changed |= ui.checkbox(&mut view.show_ascii, "Show ASCII").changed();
        changed |= ui
            .checkbox(&mut view.highlight_selection_match, "Highlight Selection Matches")
            .changed();
        changed |= ui.checkbox(&mut view.split_view, "Split View").changed();

        if changed {
            self.view_settings_changed();
        }
    }
}
