use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::paint::{Color, Paint};
use crate::text::{FontSystem, TextAlign, TextBaseline, TextStyle};

use super::{Pixmap, Surface, Transform};

#[derive(Debug, Copy, Clone, PartialEq)]
struct DrawState {
    transform: Transform,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self { transform: Transform::IDENTITY, alpha: 1.0 }
    }
}

/// Software [`Surface`] over an RGBA8 [`Pixmap`].
///
/// Rasterization inverse-maps every device pixel centre inside the transformed
/// bounds back to user space, so any affine transform (including rotation)
/// is supported. Compositing is source-over. Images are sampled
/// nearest-neighbour.
pub struct Canvas {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
    fonts: Option<Rc<FontSystem>>,
    missing_font_logged: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
            fonts: None,
            missing_font_logged: false,
        }
    }

    pub fn with_fonts(width: u32, height: u32, fonts: Rc<FontSystem>) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.fonts = Some(fonts);
        canvas
    }

    pub fn set_fonts(&mut self, fonts: Option<Rc<FontSystem>>) {
        self.fonts = fonts;
        self.missing_font_logged = false;
    }

    pub fn fonts(&self) -> Option<&Rc<FontSystem>> {
        self.fonts.as_ref()
    }

    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Clears every pixel to transparent. Transform and alpha are untouched.
    pub fn clear(&mut self) {
        self.pixmap.fill([0, 0, 0, 0]);
    }

    /// Number of saved states not yet restored.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    // ── rasterization ─────────────────────────────────────────────────────

    /// Device-pixel bounds `(x0, y0, x1, y1)` (exclusive end) of `rect` under
    /// the current transform, clipped to the buffer.
    fn device_bounds(&self, rect: Rect) -> Option<(i32, i32, i32, i32)> {
        let t = self.state.transform;
        let corners = [
            t.apply(Vec2::new(rect.x, rect.y)),
            t.apply(Vec2::new(rect.x + rect.width, rect.y)),
            t.apply(Vec2::new(rect.x, rect.y + rect.height)),
            t.apply(Vec2::new(rect.x + rect.width, rect.y + rect.height)),
        ];
        let (mut min, mut max) = (corners[0], corners[0]);
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let x0 = (min.x.floor() as i32).max(0);
        let y0 = (min.y.floor() as i32).max(0);
        let x1 = (max.x.ceil() as i32).min(self.pixmap.width() as i32);
        let y1 = (max.y.ceil() as i32).min(self.pixmap.height() as i32);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Shades every device pixel whose centre maps inside `rect`.
    ///
    /// `shade` receives the user-space point and returns the premultiplied
    /// source color, or `None` to leave the pixel alone.
    fn shade_rect(&mut self, rect: Rect, mut shade: impl FnMut(Vec2) -> Option<Color>) {
        if rect.is_empty() || self.state.alpha <= 0.0 {
            return;
        }
        let Some(inv) = self.state.transform.inverse() else { return; };
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else { return; };
        let alpha = self.state.alpha;

        for py in y0..y1 {
            for px in x0..x1 {
                let p = inv.apply(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if p.x < rect.x
                    || p.y < rect.y
                    || p.x >= rect.x + rect.width
                    || p.y >= rect.y + rect.height
                {
                    continue;
                }
                if let Some(src) = shade(p) {
                    self.blend(px, py, src.with_opacity(alpha));
                }
            }
        }
    }

    fn blend(&mut self, x: i32, y: i32, src: Color) {
        if src.a <= 0.0 {
            return;
        }
        let out = if src.a >= 1.0 {
            src
        } else {
            let Some([r, g, b, a]) = self.pixmap.pixel(x, y) else { return; };
            let dst = Color::from_srgb_u8(r, g, b, a);
            let k = 1.0 - src.a;
            Color::from_premul(src.r + dst.r * k, src.g + dst.g * k, src.b + dst.b * k, src.a + dst.a * k)
        };
        self.pixmap.set_pixel(x, y, out.to_rgba8());
    }

    fn log_missing_font(&mut self, style: &TextStyle) {
        if !self.missing_font_logged {
            log::debug!("canvas: no usable font for {:?}, skipping text", style.font);
            self.missing_font_logged = true;
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&self) -> Transform {
        self.state.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.shade_rect(rect, |p| Some(paint.color_at(p)));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let (Some(fonts), Some(font)) = (self.fonts.clone(), style.font) else {
            self.log_missing_font(style);
            return;
        };
        let Some(line) = fonts.layout_line(text, font, style.size) else {
            self.log_missing_font(style);
            return;
        };

        let ox = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - line.width / 2.0,
            TextAlign::Right => x - line.width,
        };
        let oy = match style.baseline {
            TextBaseline::Top => y,
            TextBaseline::Middle => y - (line.ascent + line.descent) / 2.0,
            TextBaseline::Alphabetic => y - line.ascent,
            TextBaseline::Bottom => y - (line.ascent + line.descent),
        };

        for glyph in &line.glyphs {
            let dst = Rect::new(ox + glyph.x, oy + glyph.y, glyph.width as f32, glyph.height as f32);
            self.shade_rect(dst, |p| {
                let gx = ((p.x - dst.x) as usize).min(glyph.width - 1);
                let gy = ((p.y - dst.y) as usize).min(glyph.height - 1);
                let coverage = *glyph.coverage.get(gy * glyph.width + gx)?;
                (coverage > 0).then(|| style.paint.color_at(p).with_opacity(coverage as f32 / 255.0))
            });
        }
    }

    fn draw_image(&mut self, image: &Pixmap, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let kx = src.width / dst.width;
        let ky = src.height / dst.height;
        let (sx0, sy0) = (src.x.floor() as i32, src.y.floor() as i32);
        let (sx1, sy1) = ((src.x + src.width).ceil() as i32 - 1, (src.y + src.height).ceil() as i32 - 1);

        self.shade_rect(dst, |p| {
            let sx = ((src.x + (p.x - dst.x) * kx).floor() as i32).clamp(sx0, sx1);
            let sy = ((src.y + (p.y - dst.y) * ky).floor() as i32).clamp(sy0, sy1);
            let [r, g, b, a] = image.pixel(sx, sy)?;
            (a > 0).then(|| Color::from_srgb_u8(r, g, b, a))
        });
    }

    fn get_image_data(&self) -> Pixmap {
        self.pixmap.clone()
    }

    fn put_image_data(&mut self, pixels: &Pixmap) {
        if pixels.width() == self.pixmap.width() && pixels.height() == self.pixmap.height() {
            self.pixmap.data_mut().copy_from_slice(pixels.data());
        } else {
            self.pixmap.copy_from(pixels, 0, 0);
        }
    }

    fn with_pixels(&mut self, f: &mut dyn FnMut(&mut Pixmap)) {
        f(&mut self.pixmap);
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("save_depth", &self.stack.len())
            .finish()
    }
}
