/// Premultiplied RGBA color with components in `[0, 1]`.
///
/// Invariant:
/// - `rgb` components are multiplied by `a`.
///
/// Pixel buffers store straight-alpha bytes; convert with [`Color::to_rgba8`]
/// and [`Color::from_srgb_u8`] at that boundary.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a premultiplied color from straight bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// Returns `None` for any other length or a non-hex digit.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();

        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, slot) in rgb.iter_mut().enumerate() {
                    let nibble = byte(&digits[i..i + 1])?;
                    *slot = nibble * 17;
                }
                Some(Self::from_srgb_u8(rgb[0], rgb[1], rgb[2], 255))
            }
            6 | 8 => {
                let r = byte(&digits[0..2])?;
                let g = byte(&digits[2..4])?;
                let b = byte(&digits[4..6])?;
                let a = if digits.len() == 8 { byte(&digits[6..8])? } else { 255 };
                Some(Self::from_srgb_u8(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: (r.clamp(0.0, 1.0)) * a,
            g: (g.clamp(0.0, 1.0)) * a,
            b: (b.clamp(0.0, 1.0)) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// Straight-alpha bytes, as stored in a `Pixmap`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let (r, g, b, a) = self.to_straight();
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(r), q(g), q(b), q(a)]
    }

    /// Scales opacity (all channels, since the color is premultiplied).
    #[inline]
    pub fn with_opacity(self, alpha: f32) -> Self {
        let k = alpha.clamp(0.0, 1.0);
        Self { r: self.r * k, g: self.g * k, b: self.b * k, a: self.a * k }
    }

    /// Component-wise interpolation in premultiplied space.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex_expands_nibbles() {
        let c = Color::from_hex("#f80").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 255]);
    }

    #[test]
    fn long_hex_with_and_without_hash() {
        assert_eq!(Color::from_hex("#102030").unwrap().to_rgba8(), [16, 32, 48, 255]);
        assert_eq!(Color::from_hex("102030").unwrap().to_rgba8(), [16, 32, 48, 255]);
    }

    #[test]
    fn hex_with_alpha_round_trips_straight_bytes() {
        let c = Color::from_hex("#ff000080").unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 0, 128]);
        assert!(c.r < 1.0, "stored premultiplied");
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#ggg").is_none());
        assert!(Color::from_hex("red").is_none());
    }

    #[test]
    fn transparent_bytes_are_zero() {
        assert_eq!(Color::transparent().to_rgba8(), [0, 0, 0, 0]);
    }
}
