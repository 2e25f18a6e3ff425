use crate::coords::Vec2;

use super::Color;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Linear gradient in the user space of the surface it is drawn on.
///
/// Stops are expected sorted by `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self {
            start,
            end,
            stops,
            spread,
        }
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.stops.iter().all(|s| s.t.is_finite() && s.color.is_finite())
            && self.stops.len() >= 2
            && (self.end.x != self.start.x || self.end.y != self.start.y)
    }

    /// Projects `p` onto the gradient axis and interpolates between stops.
    ///
    /// Degenerate gradients resolve to the first stop (or transparent).
    pub fn color_at(&self, p: Vec2) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::transparent();
        };
        if !self.is_valid() {
            return first.color;
        }

        let axis = self.end - self.start;
        let rel = p - self.start;
        let len2 = axis.x * axis.x + axis.y * axis.y;
        let t = self.spread.apply((rel.x * axis.x + rel.y * axis.y) / len2);

        let mut prev = *first;
        for stop in &self.stops {
            if t <= stop.t {
                let span = stop.t - prev.t;
                if span <= f32::EPSILON {
                    return stop.color;
                }
                return prev.color.lerp(stop.color, (t - prev.t) / span);
            }
            prev = *stop;
        }
        prev.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white(spread: SpreadMode) -> LinearGradient {
        LinearGradient::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            vec![ColorStop::new(0.0, Color::BLACK), ColorStop::new(1.0, Color::WHITE)],
            spread,
        )
    }

    #[test]
    fn midpoint_is_grey() {
        let c = black_to_white(SpreadMode::Pad).color_at(Vec2::new(5.0, 3.0));
        assert!((c.r - 0.5).abs() < 1e-4);
    }

    #[test]
    fn pad_clamps_past_end() {
        let c = black_to_white(SpreadMode::Pad).color_at(Vec2::new(25.0, 0.0));
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn reflect_mirrors_past_end() {
        let c = black_to_white(SpreadMode::Reflect).color_at(Vec2::new(15.0, 0.0));
        assert!((c.r - 0.5).abs() < 1e-4);
    }

    #[test]
    fn single_stop_is_flat() {
        let g = LinearGradient::new(
            Vec2::zero(),
            Vec2::new(1.0, 0.0),
            vec![ColorStop::new(0.0, Color::WHITE)],
            SpreadMode::Pad,
        );
        assert_eq!(g.color_at(Vec2::new(0.5, 0.0)), Color::WHITE);
    }
}
