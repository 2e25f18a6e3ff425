use crate::coords::Vec2;
use crate::paint::{Color, Paint};
use crate::surface::{Pixmap, Surface};

/// Colour input of a stroke path.
///
/// Only flat colours can be written pixel by pixel. Non-hex strings, invalid
/// hex and gradients fall back to opaque black with a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeStyle {
    /// A CSS-style colour string; `#rgb` and `#rrggbb` are understood.
    Css(String),
    Paint(Paint),
}

impl StrokeStyle {
    /// Straight-alpha bytes written into the pixel buffer.
    pub fn resolve(&self) -> [u8; 4] {
        const BLACK: [u8; 4] = [0, 0, 0, 255];
        match self {
            StrokeStyle::Css(s) if s.starts_with('#') => match Color::from_hex(s) {
                Some(c) => c.to_rgba8(),
                None => {
                    log::warn!("invalid hex color format: {s}; using black");
                    BLACK
                }
            },
            StrokeStyle::Css(s) => {
                log::warn!("unsupported color string format: {s}; using black");
                BLACK
            }
            StrokeStyle::Paint(Paint::Solid(c)) => c.to_rgba8(),
            StrokeStyle::Paint(Paint::LinearGradient(_)) => {
                log::warn!("gradients cannot be stroked per pixel; using black");
                BLACK
            }
        }
    }
}

impl From<&str> for StrokeStyle {
    fn from(s: &str) -> Self {
        StrokeStyle::Css(s.to_owned())
    }
}

impl From<String> for StrokeStyle {
    fn from(s: String) -> Self {
        StrokeStyle::Css(s)
    }
}

impl From<Color> for StrokeStyle {
    fn from(c: Color) -> Self {
        StrokeStyle::Paint(Paint::Solid(c))
    }
}

impl From<Paint> for StrokeStyle {
    fn from(p: Paint) -> Self {
        StrokeStyle::Paint(p)
    }
}

/// Recorded path operation in world coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathOp {
    MoveTo(Vec2),
    LineTo(Vec2),
}

/// One-pixel polyline written straight into the surface's pixel buffer.
///
/// Drawing bypasses the surface transform: points are made camera-relative
/// with the camera origin seen on the last step and rounded to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    pub style: StrokeStyle,
    ops: Vec<PathOp>,
    pub(crate) camera_origin: Option<Vec2>,
}

impl StrokePath {
    pub fn new(style: StrokeStyle) -> Self {
        Self { style, ops: Vec::new(), camera_origin: None }
    }

    /// Clears all recorded operations.
    pub fn begin_path(&mut self) {
        self.ops.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.ops.push(PathOp::MoveTo(Vec2::new(x, y)));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.ops.push(PathOp::LineTo(Vec2::new(x, y)));
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn camera_origin(&self) -> Option<Vec2> {
        self.camera_origin
    }

    pub(crate) fn render(&self, target: &mut dyn Surface) {
        if self.ops.is_empty() {
            return;
        }
        let rgba = self.style.resolve();
        let origin = self.camera_origin.unwrap_or_default();
        let ops = &self.ops;

        target.with_pixels(&mut |pixels: &mut Pixmap| rasterize(pixels, ops, origin, rgba));
    }
}

fn rasterize(pixels: &mut Pixmap, ops: &[PathOp], origin: Vec2, rgba: [u8; 4]) {
    let to_pixel = |p: Vec2| ((p.x - origin.x).round(), (p.y - origin.y).round());
    let max = (pixels.width() as f32 - 1.0, pixels.height() as f32 - 1.0);
    let mut current = (0.0, 0.0);

    for op in ops {
        match *op {
            PathOp::MoveTo(p) => current = to_pixel(p),
            PathOp::LineTo(p) => {
                let next = to_pixel(p);
                if let Some((a, b)) = clip(current, next, max) {
                    draw_line(pixels, a, b, rgba);
                }
                current = next;
            }
        }
    }
}

/// Liang-Barsky clip of segment `a-b` to `[0, max.0] × [0, max.1]`.
///
/// Returns whole-pixel endpoints inside the box, or `None` when nothing of
/// the segment is visible (non-finite coordinates included).
fn clip(a: (f32, f32), b: (f32, f32), max: (f32, f32)) -> Option<((i32, i32), (i32, i32))> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) || max.0 < 0.0 || max.1 < 0.0 {
        return None;
    }
    // f64 keeps the parameters exact for far endpoints.
    let (x0, y0) = (f64::from(a.0), f64::from(a.1));
    let (dx, dy) = (f64::from(b.0) - x0, f64::from(b.1) - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [(-dx, x0), (dx, f64::from(max.0) - x0), (-dy, y0), (dy, f64::from(max.1) - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        let x = (x0 + t * dx).round().clamp(0.0, f64::from(max.0));
        let y = (y0 + t * dy).round().clamp(0.0, f64::from(max.1));
        (x as i32, y as i32)
    };
    Some((at(t0), at(t1)))
}

/// Bresenham; both endpoints inclusive, off-buffer cells skipped.
fn draw_line(pixels: &mut Pixmap, (x1, y1): (i32, i32), (x2, y2): (i32, i32), rgba: [u8; 4]) {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        pixels.set_pixel(x, y, rgba);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
