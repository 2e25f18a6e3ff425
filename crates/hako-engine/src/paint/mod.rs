//! Paint model shared by actors and surfaces.
//!
//! Scope:
//! - color representation (premultiplied alpha)
//! - paint sources (solid, linear gradient)

mod color;
mod gradient;

pub use color::Color;
pub use gradient::{ColorStop, LinearGradient, SpreadMode};

use crate::coords::Vec2;

/// Paint source for filling geometry.
///
/// Surfaces resolve a paint per pixel through [`Paint::color_at`]. Pixel-level
/// consumers that need a single flat color (stroke paths) accept only `Solid`.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient(LinearGradient),
}

impl Paint {
    #[inline]
    pub fn solid(color: Color) -> Self {
        Paint::Solid(color)
    }

    /// Parses a `#rgb` / `#rrggbb` / `#rrggbbaa` string into a solid paint.
    pub fn hex(hex: &str) -> Option<Self> {
        Color::from_hex(hex).map(Paint::Solid)
    }

    /// Color of this paint at `p` (surface user space, before the transform).
    pub fn color_at(&self, p: Vec2) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::LinearGradient(g) => g.color_at(p),
        }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        match self {
            Paint::Solid(c) => c.a >= 1.0,
            Paint::LinearGradient(g) => g.stops.iter().all(|s| s.color.a >= 1.0),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Paint::LinearGradient(gradient)
    }
}
