//! Application settings persistence
//!
//! Settings are stored in a JSON file at the platform-appropriate config location:
//! - macOS: ~/Library/Application Support/hexctrl/settings.json
//! - Windows: %APPDATA%/hexctrl/settings.json
//! - Linux: ~/.config/hexctrl/settings.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::editor::{DocumentCtrl, InlineCommentMode, OffsetBase, BYTES_PER_LINE_FIT_GROUPS};

/// Maximum number of recent files to track
const MAX_RECENT_FILES: usize = 10;

/// Display options applied to every document view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Bytes per line, or one of the fit-to-width sentinels
    pub bytes_per_line: i32,
    pub bytes_per_group: i32,
    pub show_offsets: bool,
    pub offset_base: OffsetBase,
    pub show_ascii: bool,
    pub highlight_selection_match: bool,
    pub inline_comment_mode: InlineCommentMode,
    /// Show a second view of the document, scroll-linked to the first
    pub split_view: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            bytes_per_line: BYTES_PER_LINE_FIT_GROUPS,
            bytes_per_group: 4,
            show_offsets: true,
            offset_base: OffsetBase::Hex,
            show_ascii: true,
            highlight_selection_match: true,
            inline_comment_mode: InlineCommentMode::Full,
            split_view: false,
        }
    }
}

impl ViewSettings {
    /// Push these options into a control
    pub fn apply(&self, ctrl: &mut DocumentCtrl) {
        ctrl.set_bytes_per_line(self.bytes_per_line);
        ctrl.set_bytes_per_group(self.bytes_per_group);
        ctrl.set_show_offsets(self.show_offsets);
        ctrl.set_offset_base(self.offset_base);
        ctrl.set_show_ascii(self.show_ascii);
        ctrl.set_highlight_selection_match(self.highlight_selection_match);
        if ctrl.inline_comment_mode() != self.inline_comment_mode {
            ctrl.set_inline_comment_mode(self.inline_comment_mode);
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Window width in logical pixels
    pub window_width: f32,

    /// Window height in logical pixels
    pub window_height: f32,

    /// List of recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Options for the document views
    pub view: ViewSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_width: 1200.0,
            window_height: 800.0,
            recent_files: Vec::new(),
            view: ViewSettings::default(),
        }
    }
}

impl AppSettings {
    /// Get the path to the settings file
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("hexctrl");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from the config directory, or defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from `path`; a missing or unreadable file gives defaults
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read settings file {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) {
        match Self::settings_path() {
            Some(path) => {
                if let Err(e) = self.save_to(&path) {
                    log::warn!("Failed to save settings to {}: {}", path.display(), e);
                }
            }
            None => log::warn!("Could not determine config directory, settings not saved"),
        }
    }

    /// Write settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Add a file to the recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        // Remove if already in list (to move to front)
        self.recent_files.retain(|p| p != &path);

        // Add to front
        self.recent_files.insert(0, path);

        // Trim to max size
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Get the recent files list
    pub fn recent_files(&self) -> &[PathBuf] {
        &self.recent_files
    }

    /// Clear the recent files list
    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }
}
