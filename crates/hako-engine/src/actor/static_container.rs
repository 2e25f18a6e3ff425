use std::fmt;
use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::surface::{Canvas, Pixmap, Surface};
use crate::text::FontSystem;

use super::{ActorKind, ActorRef};

/// Off-screen buffer that children are rendered into once, when added.
///
/// Baked children are not retained: later changes to them never show.
pub struct StaticContainer {
    canvas: Canvas,
}

impl StaticContainer {
    /// Buffer sized to `rect`, rounded up to whole pixels.
    pub fn new(rect: Rect) -> Self {
        Self { canvas: Canvas::new(buffer_dim(rect.width), buffer_dim(rect.height)) }
    }

    /// Like [`StaticContainer::new`], with fonts so text children can bake.
    pub fn with_fonts(rect: Rect, fonts: Rc<FontSystem>) -> Self {
        Self { canvas: Canvas::with_fonts(buffer_dim(rect.width), buffer_dim(rect.height), fonts) }
    }

    pub fn set_fonts(&mut self, fonts: Option<Rc<FontSystem>>) {
        self.canvas.set_fonts(fonts);
    }

    pub fn has_fonts(&self) -> bool {
        self.canvas.fonts().is_some()
    }

    /// Renders `child` into the buffer, offset so `origin` maps to the
    /// buffer's top-left.
    pub fn bake(&mut self, child: &ActorRef, origin: Vec2) -> bool {
        let Ok(child) = child.try_borrow() else {
            log::warn!("static container: child is mutably borrowed, not baked");
            return false;
        };
        if matches!(child.kind(), ActorKind::Text(_)) && !self.has_fonts() {
            log::warn!("static container: text {:?} baked without fonts will not show", child.id());
        }
        self.canvas.save();
        self.canvas.translate(-origin.x, -origin.y);
        child.render(&mut self.canvas);
        self.canvas.restore();
        true
    }

    pub fn pixmap(&self) -> &Pixmap {
        self.canvas.pixmap()
    }

    /// Draws the whole buffer stretched into `bounds`.
    pub fn render(&self, bounds: Rect, target: &mut dyn Surface) {
        let pixmap = self.canvas.pixmap();
        target.draw_image(pixmap, pixmap.bounds(), bounds);
    }
}

fn buffer_dim(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 { v.ceil() as u32 } else { 0 }
}

impl fmt::Debug for StaticContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticContainer")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::paint::Color;
    use crate::text::TextStyle;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn children_bake_relative_to_origin() {
        let mut holder = Actor::new_static_container(Rect::new(10.0, 10.0, 4.0, 4.0));
        let child = Actor::new_rect(Rect::new(11.0, 12.0, 1.0, 1.0), Color::from_srgb_u8(255, 0, 0, 255)).shared();
        assert!(holder.add_child(&child));

        let ActorKind::StaticContainer(baked) = holder.kind() else { unreachable!() };
        assert_eq!(baked.pixmap().pixel(1, 2), Some(RED));
        assert_eq!(baked.pixmap().pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn later_child_changes_are_not_seen() {
        let mut holder = Actor::new_static_container(Rect::new(0.0, 0.0, 2.0, 1.0));
        let child = Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_srgb_u8(255, 0, 0, 255)).shared();
        holder.add_child(&child);
        child.borrow_mut().x = 1.0;

        let mut canvas = Canvas::new(2, 1);
        holder.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixmap().pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn draws_at_actor_bounds() {
        let mut holder = Actor::new_static_container(Rect::new(0.0, 0.0, 1.0, 1.0));
        let child = Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_srgb_u8(255, 0, 0, 255)).shared();
        holder.add_child(&child);
        holder.set_position(2.0, 1.0);

        let mut canvas = Canvas::new(4, 2);
        holder.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(2, 1), Some(RED));
        assert_eq!(canvas.pixmap().pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fonts_reach_the_bake_canvas() {
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        let plain = Actor::new_static_container(rect);
        let typed = Actor::new_static_container_with_fonts(rect, Rc::new(FontSystem::new()));

        let ActorKind::StaticContainer(p) = plain.kind() else { unreachable!() };
        let ActorKind::StaticContainer(t) = typed.kind() else { unreachable!() };
        assert!(!p.has_fonts());
        assert!(t.has_fonts());
    }

    #[test]
    fn text_without_fonts_still_counts_as_baked() {
        let mut holder = Actor::new_static_container(Rect::new(0.0, 0.0, 8.0, 8.0));
        let label = Actor::new_text("hi", 0.0, 0.0, TextStyle::default()).shared();
        assert!(holder.add_child(&label));

        let ActorKind::StaticContainer(baked) = holder.kind() else { unreachable!() };
        assert!(baked.pixmap().data().iter().all(|b| *b == 0));
    }
}
