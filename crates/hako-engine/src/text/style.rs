use crate::paint::{Color, Paint};

use super::FontId;

/// Horizontal anchor of a text line relative to its x coordinate.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text line relative to its y coordinate.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Alphabetic,
    Bottom,
}

/// Everything a surface needs to draw one line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// `None` draws nothing (no font loaded yet).
    pub font: Option<FontId>,
    /// Pixel size; also the line advance for multi-line text actors.
    pub size: f32,
    pub paint: Paint,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    pub fn new(font: Option<FontId>, size: f32, paint: impl Into<Paint>) -> Self {
        Self {
            font,
            size,
            paint: paint.into(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(None, 16.0, Color::BLACK)
    }
}
