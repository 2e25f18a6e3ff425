use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// One rasterized glyph positioned relative to the top-left of its line.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Rc<Vec<u8>>,
}

/// A single laid-out line of text.
#[derive(Debug, Clone)]
pub struct LineLayout {
    pub glyphs: Vec<PlacedGlyph>,
    /// Advance extent of the line.
    pub width: f32,
    /// Distance from the line top to the alphabetic baseline.
    pub ascent: f32,
    /// Distance from the baseline to the line bottom (positive).
    pub descent: f32,
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. Load everything up front, then share the
/// system with surfaces through `Rc`. Rasterized glyphs are cached for the
/// system's lifetime, keyed by font, glyph and pixel size.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
    glyph_cache: RefCell<HashMap<GlyphRasterConfig, Rc<Vec<u8>>>>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new(), glyph_cache: RefCell::new(HashMap::new()) }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    ///
    /// Returns the `FontId` that identifies the font in text styles.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("font loaded: {:?}", id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Computes the advance width and line height of `text` at `size`.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        match self.layout_line(text, id, size) {
            Some(line) => Vec2::new(line.width, line.ascent + line.descent),
            None => Vec2::new(0.0, size * 1.2),
        }
    }

    /// Lays out one line and rasterizes its visible glyphs.
    ///
    /// Returns `None` when `id` is unknown.
    pub fn layout_line(&self, text: &str, id: FontId, size: f32) -> Option<LineLayout> {
        let font = self.get(id)?;
        let size = size.max(1.0);

        let (ascent, descent) = match font.horizontal_line_metrics(size) {
            Some(m) => (m.ascent, -m.descent),
            None => (size * 0.8, size * 0.2),
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let mut width = 0.0f32;
        let mut glyphs = Vec::new();
        let mut cache = self.glyph_cache.borrow_mut();

        for g in layout.glyphs() {
            let m = font.metrics_indexed(g.key.glyph_index, size);
            width = width.max(g.x - m.xmin as f32 + m.advance_width);

            if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                continue;
            }
            let coverage = cache
                .entry(g.key)
                .or_insert_with(|| Rc::new(font.rasterize_config(g.key).1))
                .clone();

            glyphs.push(PlacedGlyph { x: g.x, y: g.y, width: g.width, height: g.height, coverage });
        }

        Some(LineLayout { glyphs, width, ascent, descent })
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSystem")
            .field("fonts", &self.fonts.len())
            .field("cached_glyphs", &self.glyph_cache.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_load() {
        let mut fonts = FontSystem::new();
        assert!(fonts.load_font(b"definitely not a font").is_err());
        assert!(fonts.is_empty());
    }

    #[test]
    fn unknown_font_has_no_layout() {
        let fonts = FontSystem::new();
        assert!(fonts.layout_line("hi", FontId(3), 12.0).is_none());
        assert_eq!(fonts.measure_text("hi", FontId(3), 10.0), Vec2::new(0.0, 12.0));
    }
}
