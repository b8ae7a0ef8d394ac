use glam::Vec2;

use crate::world::geometry::EPSILON;

/// Where a ray meets a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Distance along the ray, in units of `|dir|`.
    pub ray_dist: f32,
    /// Position along the segment: 0 at `p1`, 1 at `p2`.
    pub line_dist: f32,
}

/// Intersect the ray `origin + t * dir` (`t ≥ 0`) with segment `p1 → p2`.
///
/// With `v1 = origin - p1`, `v2 = p2 - p1`, `v3 = perp(dir)`:
///
/// ```text
/// denom = v2 · v3
/// t1    = perp_dot(v2, v1) / denom      // along the ray
/// t2    = (v1 · v3) / denom             // along the segment
/// ```
///
/// Returns `None` when the ray is parallel to the segment (or either is
/// zero length), points away from it, or passes outside `[p1, p2]`.
pub fn line_ray_intersect(origin: Vec2, dir: Vec2, p1: Vec2, p2: Vec2) -> Option<Intersection> {
    let v1 = origin - p1;
    let v2 = p2 - p1;
    let v3 = dir.perp();

    let denom = v2.dot(v3);
    // relative to the input lengths so the test is scale-free
    if !denom.is_finite() || denom.abs() <= EPSILON * v2.length() * dir.length() {
        return None;
    }

    let t1 = v2.perp_dot(v1) / denom;
    let t2 = v1.dot(v3) / denom;

    (t1 >= 0.0 && (0.0..=1.0).contains(&t2)).then_some(Intersection {
        ray_dist: t1,
        line_dist: t2,
    })
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
