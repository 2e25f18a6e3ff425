use std::rc::Rc;

use crate::coords::Rect;
use crate::paint::Paint;
use crate::surface::{Pixmap, Surface};
use crate::text::TextStyle;

use super::{Actor, Container, StaticContainer, StrokePath};

/// Solid or gradient rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RectFill {
    pub paint: Paint,
}

/// Multi-line text; lines advance by `style.size`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub style: TextStyle,
}

/// Region of a shared image.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub image: Rc<Pixmap>,
    /// Region of `image` drawn; animation traits rewrite it per frame.
    pub source: Rect,
}

impl Sprite {
    pub fn new(image: Rc<Pixmap>) -> Self {
        let source = image.bounds();
        Self { image, source }
    }
}

/// Closed set of actor variants.
#[derive(Debug)]
pub enum ActorKind {
    Null,
    Rect(RectFill),
    Text(TextBlock),
    Sprite(Sprite),
    StrokePath(StrokePath),
    Container(Container),
    StaticContainer(StaticContainer),
}

impl ActorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActorKind::Null => "null",
            ActorKind::Rect(_) => "rect",
            ActorKind::Text(_) => "text",
            ActorKind::Sprite(_) => "sprite",
            ActorKind::StrokePath(_) => "stroke-path",
            ActorKind::Container(_) => "container",
            ActorKind::StaticContainer(_) => "static-container",
        }
    }

    pub fn is_sprite(&self) -> bool {
        matches!(self, ActorKind::Sprite(_))
    }

    pub(super) fn render(&self, actor: &Actor, target: &mut dyn Surface) {
        match self {
            ActorKind::Null => {}

            ActorKind::Rect(fill) => {
                target.save();
                target.set_global_alpha(actor.alpha);
                target.fill_rect(actor.bounds(), &fill.paint);
                target.restore();
            }

            ActorKind::Text(block) => {
                target.save();
                target.set_global_alpha(actor.alpha);
                for (i, line) in block.text.split('\n').enumerate() {
                    target.fill_text(line, actor.x, actor.y + block.style.size * i as f32, &block.style);
                }
                target.restore();
            }

            ActorKind::Sprite(sprite) => render_sprite(actor, sprite, target),

            ActorKind::StrokePath(path) => path.render(target),

            ActorKind::Container(children) => children.render(target),

            ActorKind::StaticContainer(baked) => {
                target.save();
                target.set_global_alpha(actor.alpha);
                baked.render(actor.bounds(), target);
                target.restore();
            }
        }
    }
}

/// Translate to the truncated centre, scale, rotate, then draw at the
/// offset back to the truncated top-left.
fn render_sprite(actor: &Actor, sprite: &Sprite, target: &mut dyn Surface) {
    let center = actor.bounds().center();
    let local_x = actor.x.trunc() - center.x;
    let local_y = actor.y.trunc() - center.y;

    target.save();
    target.set_global_alpha(actor.alpha);
    target.translate(center.x.trunc(), center.y.trunc());
    target.scale(actor.scale_x, actor.scale_y);
    target.rotate(actor.rotation.to_radians());
    target.draw_image(
        &sprite.image,
        sprite.source,
        Rect::new(local_x.trunc(), local_y.trunc(), actor.width, actor.height),
    );
    target.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::surface::{Canvas, Transform};

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn red_image(w: u32, h: u32) -> Rc<Pixmap> {
        let mut p = Pixmap::new(w, h);
        p.fill(RED);
        Rc::new(p)
    }

    #[test]
    fn rect_honours_alpha_and_leaves_state_clean() {
        let mut canvas = Canvas::new(2, 1);
        let mut a = Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        a.alpha = 0.0;
        a.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.global_alpha(), 1.0);
    }

    #[test]
    fn sprite_draws_at_bounds() {
        let mut canvas = Canvas::new(8, 8);
        let a = Actor::new(Rect::new(2.0, 3.0, 2.0, 2.0), ActorKind::Sprite(Sprite::new(red_image(1, 1))));
        a.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(2, 3), Some(RED));
        assert_eq!(canvas.pixmap().pixel(3, 4), Some(RED));
        assert_eq!(canvas.pixmap().pixel(4, 4), Some([0, 0, 0, 0]));
        assert_eq!(canvas.transform(), Transform::IDENTITY);
    }

    #[test]
    fn sprite_flip_mirrors_about_centre() {
        let mut img = Pixmap::new(2, 1);
        img.set_pixel(0, 0, RED);
        img.set_pixel(1, 0, [0, 0, 255, 255]);

        let mut canvas = Canvas::new(4, 1);
        let mut a = Actor::new(Rect::new(0.0, 0.0, 4.0, 1.0), ActorKind::Sprite(Sprite::new(Rc::new(img))));
        a.scale_x = -1.0;
        a.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(canvas.pixmap().pixel(3, 0), Some(RED));
    }

    #[test]
    fn text_without_fonts_is_silent() {
        let mut canvas = Canvas::new(4, 4);
        let a = Actor::new_text("a\nb", 0.0, 0.0, TextStyle::default());
        a.render(&mut canvas);
        assert!(canvas.pixmap().data().iter().all(|b| *b == 0));
    }
}
