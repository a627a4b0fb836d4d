//! hexctrl: a hex document viewer and editor
//!
//! Shows a byte document as interleaved data and comment regions, with
//! nested annotations, keyboard and mouse selection, and a second view that
//! scrolls in lockstep with the first.

mod app;
mod document;
mod editor;
mod settings;
mod ui;

use app::HexApp;
use eframe::NativeOptions;
use settings::AppSettings;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Load settings for window size
    let settings = AppSettings::load();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([settings.window_width, settings.window_height])
        .with_min_inner_size([640.0, 400.0])
        .with_drag_and_drop(true);

    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "hexctrl",
        options,
        Box::new(|cc| Ok(Box::new(HexApp::new(cc, settings)))),
    )
}
