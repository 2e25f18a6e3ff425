use crate::coords::Rect;

/// RGBA8 pixel buffer, straight alpha, row-major, no row padding.
///
/// Used for decoded images, surface read-back/write-back and off-screen
/// buffers.
#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, data: vec![0; width as usize * height as usize * 4] }
    }

    /// Wraps existing bytes. Returns `None` when the length does not match.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full-image rectangle, handy as a `draw_image` source.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel at `(x, y)`; `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Writes one pixel. Out-of-bounds writes are ignored; returns whether
    /// the pixel was written.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i..i + 4].copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Copies `src` into this buffer with its top-left at `(dx, dy)`, clipped.
    pub fn copy_from(&mut self, src: &Pixmap, dx: i32, dy: i32) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                if let (Some(rgba), Some(i)) = (src.pixel(sx, sy), self.index(sx + dx, sy + dy)) {
                    self.data[i..i + 4].copy_from_slice(&rgba);
                }
            }
        }
    }
}

impl std::fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pixmap").field("width", &self.width).field("height", &self.height).finish()
    }
}
