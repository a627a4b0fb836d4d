//! Colour table used when drawing regions

use egui::Color32;

/// Number of highlight colour slots available to documents
pub const NUM_HIGHLIGHTS: usize = 6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColourIndex {
    NormalTextBg,
    NormalTextFg,
    /// Dimmed text (offset gutter, unprintable ASCII)
    AlternateTextFg,
    InvertTextBg,
    InvertTextFg,
    SelectedTextBg,
    SelectedTextFg,
    /// Other occurrences of the selected bytes
    SecondarySelectedTextBg,
    SecondarySelectedTextFg,
    CommentBg,
    CommentFg,
    /// Indentation brackets around nested regions
    IndentGuide,
    HighlightBg(usize),
    HighlightFg(usize),
}

#[derive(Clone, Debug)]
pub struct Palette {
    normal_bg: Color32,
    normal_fg: Color32,
    alternate_fg: Color32,
    invert_bg: Color32,
    invert_fg: Color32,
    selected_bg: Color32,
    selected_fg: Color32,
    secondary_bg: Color32,
    secondary_fg: Color32,
    comment_bg: Color32,
    comment_fg: Color32,
    indent_guide: Color32,
    highlight_bg: [Color32; NUM_HIGHLIGHTS],
    highlight_fg: [Color32; NUM_HIGHLIGHTS],
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            normal_bg: Color32::from_rgb(24, 24, 28),
            normal_fg: Color32::from_rgb(220, 220, 220),
            alternate_fg: Color32::GRAY,
            invert_bg: Color32::from_rgb(80, 80, 160),
            invert_fg: Color32::WHITE,
            selected_bg: Color32::from_rgb(40, 80, 40),
            selected_fg: Color32::WHITE,
            secondary_bg: Color32::from_rgb(180, 180, 60),
            secondary_fg: Color32::BLACK,
            comment_bg: Color32::from_rgb(40, 40, 80),
            comment_fg: Color32::from_rgb(200, 200, 230),
            indent_guide: Color32::DARK_GRAY,
            highlight_bg: [
                Color32::from_rgb(140, 50, 50),
                Color32::from_rgb(200, 120, 40),
                Color32::from_rgb(60, 160, 180),
                Color32::from_rgb(60, 140, 60),
                Color32::from_rgb(130, 70, 160),
                Color32::from_rgb(160, 150, 50),
            ],
            highlight_fg: [Color32::WHITE; NUM_HIGHLIGHTS],
        }
    }

    pub fn get(&self, index: ColourIndex) -> Color32 {
        match index {
            ColourIndex::NormalTextBg => self.normal_bg,
            ColourIndex::NormalTextFg => self.normal_fg,
            ColourIndex::AlternateTextFg => self.alternate_fg,
            ColourIndex::InvertTextBg => self.invert_bg,
            ColourIndex::InvertTextFg => self.invert_fg,
            ColourIndex::SelectedTextBg => self.selected_bg,
            ColourIndex::SelectedTextFg => self.selected_fg,
            ColourIndex::SecondarySelectedTextBg => self.secondary_bg,
            ColourIndex::SecondarySelectedTextFg => self.secondary_fg,
            ColourIndex::CommentBg => self.comment_bg,
            ColourIndex::CommentFg => self.comment_fg,
            ColourIndex::IndentGuide => self.indent_guide,
            ColourIndex::HighlightBg(i) => self.highlight_bg[i % NUM_HIGHLIGHTS],
            ColourIndex::HighlightFg(i) => self.highlight_fg[i % NUM_HIGHLIGHTS],
        }
    }
}
