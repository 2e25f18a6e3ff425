use std::ops::{Deref, DerefMut};

use crate::surface::Surface;

/// Guard holding a surface inside a camera transform.
///
/// Restores the surface exactly once, on [`TransformScope::reset`] or on drop.
/// Draw through the guard (it derefs to the surface) while it is alive.
pub struct TransformScope<'s, S: Surface + ?Sized> {
    surface: &'s mut S,
    active: bool,
}

impl<'s, S: Surface + ?Sized> TransformScope<'s, S> {
    pub(super) fn new(surface: &'s mut S) -> Self {
        Self { surface, active: true }
    }

    /// Restores the surface now.
    pub fn reset(mut self) {
        self.restore_once();
    }

    fn restore_once(&mut self) {
        if self.active {
            self.active = false;
            self.surface.restore();
        }
    }
}

impl<S: Surface + ?Sized> Deref for TransformScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for TransformScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for TransformScope<'_, S> {
    fn drop(&mut self) {
        self.restore_once();
    }
}
