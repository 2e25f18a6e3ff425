use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
///
/// Edges are inclusive pixel coordinates: a 10×10 rectangle at the origin
/// spans `left = 0` to `right = 9`. Zero width/height is allowed and is
/// used for logic-only actors.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn left(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width - 1.0
    }

    #[inline]
    pub fn top(self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height - 1.0
    }

    #[inline]
    pub fn center_x(self) -> f32 {
        self.x + (self.width / 2.0).floor()
    }

    #[inline]
    pub fn center_y(self) -> f32 {
        self.y + (self.height / 2.0).floor()
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// True when both the horizontal and vertical extents overlap (edges inclusive).
    #[inline]
    pub fn intersects(self, other: Rect) -> bool {
        let horizontal = self.left() <= other.right() && self.right() >= other.left();
        let vertical = self.top() <= other.bottom() && self.bottom() >= other.top();
        horizontal && vertical
    }

    /// Inclusive containment test against the derived edges.
    #[inline]
    pub fn contains(self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    #[inline]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn edges_are_inclusive() {
        let rect = r(2.0, 3.0, 10.0, 4.0);
        assert_eq!(rect.left(), 2.0);
        assert_eq!(rect.right(), 11.0);
        assert_eq!(rect.top(), 3.0);
        assert_eq!(rect.bottom(), 6.0);
    }

    #[test]
    fn center_floors_half_size() {
        let rect = r(0.0, 0.0, 5.0, 3.0);
        assert_eq!(rect.center(), Vec2::new(2.0, 1.0));
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_last_pixel() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(9.0, 9.0));
    }

    #[test]
    fn contains_excludes_one_past_the_edge() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(10.0, 10.0));
    }

    #[test]
    fn contains_top_left() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(0.0, 0.0));
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(-1.0, 5.0));
    }

    // ── intersects ────────────────────────────────────────────────────────

    #[test]
    fn intersects_is_symmetric() {
        let cases = [
            (r(0.0, 0.0, 10.0, 10.0), r(5.0, 5.0, 10.0, 10.0)),
            (r(0.0, 0.0, 10.0, 10.0), r(10.0, 0.0, 10.0, 10.0)),
            (r(0.0, 0.0, 10.0, 10.0), r(9.0, 9.0, 1.0, 1.0)),
            (r(-4.0, 2.0, 3.0, 3.0), r(20.0, 20.0, 5.0, 5.0)),
        ];
        for (a, b) in cases {
            assert_eq!(a.intersects(b), b.intersects(a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn rectangle_intersects_itself() {
        let a = r(3.0, 7.0, 4.0, 2.0);
        assert!(a.intersects(a));
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        // right() of `a` is 9, left() of `b` is 10.
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(b));
    }

    #[test]
    fn sharing_one_pixel_intersects() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(9.0, 9.0, 10.0, 10.0);
        assert!(a.intersects(b));
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn zero_size_is_empty() {
        assert!(r(0.0, 0.0, 0.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
