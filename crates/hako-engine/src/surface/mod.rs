//! 2D rendering surface.
//!
//! [`Surface`] is the drawing contract actors render against. It follows the
//! immediate-mode canvas model: a current transform and global alpha, a
//! save/restore stack for both, and direct pixel read-back/write-back.
//!
//! [`Canvas`] is the CPU implementation backed by a [`Pixmap`]. The desktop
//! runtime presents it through the GPU; tests draw into it directly.

mod canvas;
mod pixmap;
mod transform;

pub use canvas::Canvas;
pub use pixmap::Pixmap;
pub use transform::Transform;

use crate::coords::Rect;
use crate::paint::Paint;
use crate::text::TextStyle;

pub trait Surface {
    /// Width in device pixels.
    fn width(&self) -> u32;
    /// Height in device pixels.
    fn height(&self) -> u32;

    /// Pushes the current transform and global alpha.
    fn save(&mut self);
    /// Pops the last saved state. Unbalanced restores are ignored.
    fn restore(&mut self);

    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);

    fn translate(&mut self, tx: f32, ty: f32) {
        let t = self.transform().translated(tx, ty);
        self.set_transform(t);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        let t = self.transform().scaled(sx, sy);
        self.set_transform(t);
    }

    /// Rotates the user space clockwise by `radians`.
    fn rotate(&mut self, radians: f32) {
        let t = self.transform().rotated(radians);
        self.set_transform(t);
    }

    fn global_alpha(&self) -> f32;
    fn set_global_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    /// Draws one line of text anchored at `(x, y)` per the style's
    /// align/baseline.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    /// Draws the `src` region of `image` stretched into `dst`.
    fn draw_image(&mut self, image: &Pixmap, src: Rect, dst: Rect);

    /// Copy of the device pixels. Ignores transform and alpha.
    fn get_image_data(&self) -> Pixmap;

    /// Overwrites device pixels from `(0, 0)`. Ignores transform and alpha.
    fn put_image_data(&mut self, pixels: &Pixmap);

    /// Runs `f` against the device pixel buffer.
    ///
    /// The default round-trips through `get_image_data`/`put_image_data`;
    /// surfaces that own their buffer hand it out directly.
    fn with_pixels(&mut self, f: &mut dyn FnMut(&mut Pixmap)) {
        let mut pixels = self.get_image_data();
        f(&mut pixels);
        self.put_image_data(&pixels);
    }
}
