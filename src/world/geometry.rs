use glam::Vec2;

/// Lengths at or below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Vector helpers glam does not provide with the behaviour we need.
///
/// `dot`, `perp` (`(-y, x)`, a counter-clockwise quarter turn) and
/// `perp_dot` (`a.x * b.y - a.y * b.x`) come straight from [`Vec2`].
pub trait VecExt {
    /// Unit vector, or `None` when the length is within [`EPSILON`] of zero.
    fn normalize_eps(self) -> Option<Vec2>;

    /// Rotate counter-clockwise by `angle` radians.
    fn rotated(self, angle: f32) -> Vec2;
}

impl VecExt for Vec2 {
    #[inline]
    fn normalize_eps(self) -> Option<Vec2> {
        let len = self.length();
        if !len.is_finite() || len <= EPSILON {
            return None;
        }
        Some(self / len)
    }

    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        // [ cos -sin ] [x]
        // [ sin  cos ] [y]
        let (s, c) = angle.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }
}

/// Axis-aligned pixel rectangle, `min` inclusive and `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Overlap of two rectangles (may be empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

/// Signed area of a closed polygon (shoelace).  Negative = clockwise in a
/// y-up world.
pub fn signed_area(points: impl IntoIterator<Item = Vec2>) -> f32 {
    let pts: Vec<Vec2> = points.into_iter().collect();
    if pts.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in pts.iter().enumerate() {
        let b = pts[(i + 1) % pts.len()];
        twice += a.perp_dot(b);
    }
    twice * 0.5
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn double_perp_is_negation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v = vec2(rng.gen_range(-1e3..1e3), rng.gen_range(-1e3..1e3));
            assert_eq!(v.perp().perp(), -v);
        }
    }

    #[test]
    fn perp_is_counter_clockwise() {
        assert_eq!(vec2(1.0, 0.0).perp(), vec2(0.0, 1.0));
        assert_eq!(vec2(1.0, 0.0).perp_dot(vec2(0.0, 1.0)), 1.0);
    }

    #[test]
    fn normalize_has_unit_length() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let v = vec2(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
            if v.length() <= EPSILON {
                continue;
            }
            let n = v.normalize_eps().unwrap();
            assert!((n.length() - 1.0).abs() < 1e-5, "{v:?} -> {n:?}");
        }
    }

    #[test]
    fn normalize_degenerate_is_none() {
        assert_eq!(Vec2::ZERO.normalize_eps(), None);
        assert_eq!(vec2(1e-7, -1e-7).normalize_eps(), None);
        assert_eq!(vec2(f32::NAN, 1.0).normalize_eps(), None);
    }

    #[test]
    fn rotate_quarter_turn() {
        let r = vec2(0.0, 1.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!((r - vec2(-1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn rect_is_half_open() {
        let r = Rect::new(0, 140, 100, 240);
        assert!(r.contains(0, 140));
        assert!(r.contains(99, 239));
        assert!(!r.contains(100, 200));
        assert!(!r.contains(50, 240));
        let none = r.intersect(&Rect::new(200, 0, 300, 10));
        assert!(!none.contains(200, 5) && !none.contains(50, 150));
    }

    #[test]
    fn clockwise_square_has_negative_area() {
        let cw = [vec2(0.0, 1.0), vec2(1.0, 1.0), vec2(1.0, 0.0), vec2(0.0, 0.0)];
        assert_eq!(signed_area(cw), -1.0);
    }
}
