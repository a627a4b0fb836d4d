//! Fixed-width font metrics with a lazily filled string width cache

use std::cell::OnceCell;

/// Number of string lengths whose pixel width is cached
const WIDTH_CACHE_SIZE: usize = 512;

/// Something that can measure runs of a monospace font
pub trait GlyphSource {
    /// Height of one text line in pixels
    fn char_height(&self) -> i32;

    /// Pixel width of a run of `chars` characters
    fn text_width(&self, chars: usize) -> i32;
}

/// Glyph source with an exact pixel advance per character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedGlyphs {
    pub width: i32,
    pub height: i32,
}

impl FixedGlyphs {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl GlyphSource for FixedGlyphs {
    fn char_height(&self) -> i32 {
        self.height
    }

    fn text_width(&self, chars: usize) -> i32 {
        (chars as i32).saturating_mul(self.width)
    }
}

/// Font metrics used by every layout computation
///
/// String widths are measured on first use and cached. Replacing the font
/// means building a new `FontMetrics`, which starts with an empty cache.
pub struct FontMetrics {
    source: Box<dyn GlyphSource>,
    widths: Box<[OnceCell<i32>]>,
}

impl FontMetrics {
    pub fn new(source: impl GlyphSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            widths: (0..WIDTH_CACHE_SIZE).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn char_height(&self) -> i32 {
        self.source.char_height().max(1)
    }

    pub fn char_width(&self) -> i32 {
        self.string_width(1).max(1)
    }

    /// Pixel width of a string of `chars` characters
    pub fn string_width(&self, chars: usize) -> i32 {
        match self.widths.get(chars) {
            Some(cell) => *cell.get_or_init(|| self.source.text_width(chars)),
            None => self.source.text_width(chars),
        }
    }

    /// Index of the character under pixel `x` in a run starting at 0
    ///
    /// Equivalently, the number of whole characters that fit in `x` pixels.
    /// Returns `None` for negative `x`.
    pub fn char_at_x(&self, x: i32) -> Option<usize> {
        if x < 0 {
            return None;
        }

        // Largest n with string_width(n) <= x
        let mut lo = 0usize;
        let mut hi = x as usize + 1;
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if self.string_width(mid) <= x {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        Some(lo)
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new(FixedGlyphs::new(8, 16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingGlyphs {
        calls: Rc<Cell<usize>>,
    }

    impl GlyphSource for CountingGlyphs {
        fn char_height(&self) -> i32 {
            14
        }

        fn text_width(&self, chars: usize) -> i32 {
            self.calls.set(self.calls.get() + 1);
            chars as i32 * 7
        }
    }

    #[test]
    fn test_string_width_is_cached() {
        let calls = Rc::new(Cell::new(0));
        let metrics = FontMetrics::new(CountingGlyphs {
            calls: calls.clone(),
        });

        assert_eq!(metrics.string_width(10), 70);
        assert_eq!(metrics.string_width(10), 70);
        assert_eq!(calls.get(), 1);

        // Beyond the cache every call is measured
        assert_eq!(metrics.string_width(1000), 7000);
        assert_eq!(metrics.string_width(1000), 7000);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_new_font_starts_with_fresh_cache() {
        let mut metrics = FontMetrics::new(FixedGlyphs::new(8, 16));
        assert_eq!(metrics.string_width(4), 32);

        metrics = FontMetrics::new(FixedGlyphs::new(10, 20));
        assert_eq!(metrics.string_width(4), 40);
        assert_eq!(metrics.char_height(), 20);
    }

    #[test]
    fn test_char_at_x() {
        let metrics = FontMetrics::new(FixedGlyphs::new(8, 16));

        assert_eq!(metrics.char_at_x(-1), None);
        assert_eq!(metrics.char_at_x(0), Some(0));
        assert_eq!(metrics.char_at_x(7), Some(0));
        assert_eq!(metrics.char_at_x(8), Some(1));
        assert_eq!(metrics.char_at_x(805), Some(100));
    }
}
