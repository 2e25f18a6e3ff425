use crate::coords::Vec2;

/// 2D affine transform in the canvas `(a, b, c, d, e, f)` layout:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Clockwise rotation in screen space (+Y down), `radians`.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    /// `self × rhs`: `rhs` is applied to points first.
    pub fn then(self, rhs: Transform) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    #[inline]
    pub fn translated(self, tx: f32, ty: f32) -> Self {
        self.then(Self::translation(tx, ty))
    }

    #[inline]
    pub fn scaled(self, sx: f32, sy: f32) -> Self {
        self.then(Self::scaling(sx, sy))
    }

    #[inline]
    pub fn rotated(self, radians: f32) -> Self {
        self.then(Self::rotation(radians))
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        Vec2::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Returns `None` for singular transforms (e.g. a zero scale).
    pub fn inverse(self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    pub fn approx_eq(self, other: Transform, eps: f32) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.e - other.e,
            self.f - other.f,
        ]
        .iter()
        .all(|d| d.abs() <= eps)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_scale_applies_scale_first() {
        let t = Transform::IDENTITY.translated(10.0, 5.0).scaled(2.0, 3.0);
        assert_eq!(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 8.0));
    }

    #[test]
    fn quarter_turn_maps_x_axis_to_y_axis() {
        let p = Transform::rotation(std::f32::consts::FRAC_PI_2).apply(Vec2::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform::IDENTITY.translated(3.0, -2.0).rotated(0.7).scaled(2.0, 0.5);
        let inv = t.inverse().unwrap();
        assert!(t.then(inv).approx_eq(Transform::IDENTITY, 1e-5));
    }

    #[test]
    fn zero_scale_has_no_inverse() {
        assert!(Transform::scaling(0.0, 1.0).inverse().is_none());
    }
}
