use eframe::egui;

use super::HexApp;

/// Global shortcuts seen this frame, run after input is released
#[derive(Default)]
pub(super) struct InputActions {
    pub open: bool,
    pub save: bool,
    pub toggle_split: bool,
}

impl HexApp {
    /// Handle dropped files and keyboard shortcuts
    /// Returns flags for deferred actions
    pub(super) fn handle_input(&mut self, ctx: &egui::Context) -> InputActions {
        let mut actions = InputActions::default();
        let mut dropped = Vec::new();

        ctx.input(|i| {
            dropped.extend(i.raw.dropped_files.iter().filter_map(|f| f.path.clone()));

            let ctrl = i.modifiers.ctrl || i.modifiers.mac_cmd;
            if ctrl && i.key_pressed(egui::Key::O) {
                actions.open = true;
            }
            if ctrl && i.key_pressed(egui::Key::S) && self.open.is_some() {
                actions.save = true;
            }
            // Split view: Ctrl+\ / Cmd+\
            if ctrl && i.key_pressed(egui::Key::Backslash) && self.open.is_some() {
                actions.toggle_split = true;
            }
        });

        // Only the last file dropped stays open
        if let Some(path) = dropped.pop() {
            self.open_file(path);
        }

        actions
    }

    pub(super) fn process_input_actions(&mut self, actions: InputActions) {
        if actions.open {
            self.open_file_dialog();
        }
        if actions.save {
            self.save_file();
        }
        if actions.toggle_split {
            self.settings.view.split_view = !self.settings.view.split_view;
            self.view_settings_changed();
        }
    }
}
