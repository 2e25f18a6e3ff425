//! Text rendering support.
//!
//! Fonts are loaded into a [`FontSystem`] owned by the application and shared
//! with surfaces (`Rc<FontSystem>`). Text actors refer to fonts by [`FontId`].

mod font_system;
mod style;

pub use font_system::{FontId, FontLoadError, FontSystem, LineLayout, PlacedGlyph};
pub use style::{TextAlign, TextBaseline, TextStyle};
