//! World-to-surface viewport.

mod scope;

pub use scope::TransformScope;

use crate::coords::{Rect, Vec2};
use crate::surface::Surface;

/// Viewport rectangle in world space plus rotation (degrees, clockwise).
///
/// The viewport is stretched to fill the whole surface when applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

impl Camera {
    pub fn new(rect: Rect) -> Self {
        Self { x: rect.x, y: rect.y, width: rect.width, height: rect.height, rotation: 0.0 }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Moves the viewport so its centre lands on `(x, y)`.
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.x = x - (self.width / 2.0).floor();
        self.y = y - (self.height / 2.0).floor();
    }

    /// Pushes the surface state and installs the world-to-surface transform.
    ///
    /// The returned scope restores the surface when dropped or reset.
    pub fn apply_transform<'s, S: Surface + ?Sized>(&self, surface: &'s mut S) -> TransformScope<'s, S> {
        surface.save();

        if self.width > 0.0 && self.height > 0.0 {
            surface.scale(surface.width() as f32 / self.width, surface.height() as f32 / self.height);
        }
        surface.translate(-self.x.floor(), -self.y.floor());

        let center = self.rect().center();
        surface.translate(center.x, center.y);
        surface.rotate(self.rotation.to_radians());
        surface.translate(-center.x, -center.y);

        TransformScope::new(surface)
    }

    /// Explicit restore for callers that pair `save` manually instead of
    /// holding a [`TransformScope`].
    pub fn reset_transform<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.restore();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Rect::new(0.0, 0.0, 0.0, 0.0))
    }
}
