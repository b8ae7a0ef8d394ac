use glam::{Mat2, Vec2};
use thiserror::Error;

use crate::world::geometry::{EPSILON, VecExt};

/// Camera-plane magnitude for a ~66° horizontal field of view.
pub const DEFAULT_FOV_SCALE: f32 = 0.66;

#[derive(Error, Debug, PartialEq)]
pub enum TransformError {
    /// `dir` and `plane` are collinear; the view basis cannot be inverted.
    #[error("degenerate view basis (determinant {det})")]
    Degenerate { det: f32 },
}

/// Player state: the only mutable world state, owned by the frame driver.
///
/// * `dir` is kept unit length.
/// * The camera plane is *derived* from `dir` each time it is needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    dir: Vec2,
    fov_scale: f32,
}

impl Player {
    /// Player at `pos` facing `dir`; a degenerate `dir` falls back to +Y.
    pub fn new(pos: Vec2, dir: Vec2, fov_scale: f32) -> Self {
        Self {
            pos,
            dir: dir.normalize_eps().unwrap_or(Vec2::Y),
            fov_scale,
        }
    }

    /// Unit facing vector.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    /// `perp(dir) * -fov_scale`: points to the viewer's right.
    #[inline]
    pub fn camera_plane(&self) -> Vec2 {
        self.dir.perp() * -self.fov_scale
    }

    pub fn view(&self) -> View {
        View::new(self.pos, self.dir, self.camera_plane())
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move `forward` units along `dir` and `left` units along `perp(dir)`.
    pub fn step(&mut self, forward: f32, left: f32) {
        self.pos += self.dir * forward + self.dir.perp() * left;
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn turn(&mut self, angle: f32) {
        if let Some(d) = self.dir.rotated(angle).normalize_eps() {
            self.dir = d;
        }
    }
}

/// View basis for one frame: origin, facing and camera plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub pos: Vec2,
    pub dir: Vec2,
    pub plane: Vec2,
}

impl View {
    pub fn new(pos: Vec2, dir: Vec2, plane: Vec2) -> Self {
        Self { pos, dir, plane }
    }

    /// `camera_x = 2 * (x / width) - 1`, in `[-1, 1)`.
    #[inline]
    pub fn camera_x(x: usize, width: usize) -> f32 {
        2.0 * (x as f32 / width.max(1) as f32) - 1.0
    }

    /// Unit ray direction through screen column `x`, `None` if degenerate.
    #[inline]
    pub fn column_dir(&self, x: usize, width: usize) -> Option<Vec2> {
        (self.dir + self.plane * Self::camera_x(x, width)).normalize_eps()
    }

    /// World → view space: `(lateral, depth)` with
    /// `world = pos + lateral * plane + depth * dir`.
    pub fn to_view_space(&self, world: Vec2) -> Result<Vec2, TransformError> {
        let basis = Mat2::from_cols(self.plane, self.dir);
        let det = basis.determinant();
        if !det.is_finite() || det.abs() <= EPSILON {
            return Err(TransformError::Degenerate { det });
        }
        Ok(basis.inverse() * (world - self.pos))
    }

    /// View space → world; inverse of [`View::to_view_space`].
    pub fn from_view_space(&self, view: Vec2) -> Vec2 {
        self.pos + self.plane * view.x + self.dir * view.y
    }
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
    fn default_plane_points_right() {
        let p = Player::new(Vec2::ZERO, vec2(0.0, 1.0), DEFAULT_FOV_SCALE);
        assert!((p.camera_plane() - vec2(0.66, 0.0)).length() < 1e-6);
    }

    #[test]
    fn plane_follows_turn() {
        let mut p = Player::new(Vec2::ZERO, vec2(0.0, 1.0), DEFAULT_FOV_SCALE);
        p.turn(0.7);
        assert!(p.dir().dot(p.camera_plane()).abs() < 1e-6);
        assert!((p.dir().length() - 1.0).abs() < 1e-6);
        assert!((p.camera_plane().length() - DEFAULT_FOV_SCALE).abs() < 1e-6);
    }

    #[test]
    fn step_moves_forward_and_strafes_left() {
        let mut p = Player::new(Vec2::ZERO, vec2(0.0, 1.0), DEFAULT_FOV_SCALE);
        p.step(0.08, 0.0);
        assert!((p.pos - vec2(0.0, 0.08)).length() < 1e-6);
        p.step(0.0, 0.06);
        assert!((p.pos - vec2(-0.06, 0.08)).length() < 1e-6);
    }

    #[test]
    fn degenerate_dir_falls_back() {
        let p = Player::new(Vec2::ZERO, Vec2::ZERO, DEFAULT_FOV_SCALE);
        assert_eq!(p.dir(), Vec2::Y);
    }

    #[test]
    fn view_space_round_trip() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let player = Player::new(
                vec2(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)),
                Vec2::from_angle(angle),
                rng.gen_range(0.2..2.0),
            );
            let view = player.view();
            let world = vec2(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            let back = view.from_view_space(view.to_view_space(world).unwrap());
            assert!((back - world).length() < 1e-3, "{world:?} -> {back:?}");
        }
    }

    #[test]
    fn view_space_axes() {
        let view = Player::new(Vec2::ZERO, vec2(0.0, 1.0), DEFAULT_FOV_SCALE).view();
        // straight ahead: lateral 0, depth 4
        let v = view.to_view_space(vec2(0.0, 4.0)).unwrap();
        assert!((v - vec2(0.0, 4.0)).length() < 1e-6);
        // to the right, in plane units
        let v = view.to_view_space(vec2(0.66, 0.0)).unwrap();
        assert!((v - vec2(1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn collinear_basis_is_rejected() {
        let view = View::new(Vec2::ZERO, vec2(0.0, 1.0), vec2(0.0, 2.0));
        assert!(matches!(
            view.to_view_space(vec2(1.0, 1.0)),
            Err(TransformError::Degenerate { .. })
        ));
    }

    #[test]
    fn edge_columns_span_the_plane() {
        let view = Player::new(Vec2::ZERO, vec2(0.0, 1.0), DEFAULT_FOV_SCALE).view();
        let left = view.column_dir(0, 320).unwrap();
        let mid = view.column_dir(160, 320).unwrap();
        assert!(left.x < 0.0);
        assert!((mid - vec2(0.0, 1.0)).length() < 1e-6);
        let zero = View::new(Vec2::ZERO, vec2(1.0, 0.0), vec2(-1.0, 0.0));
        assert_eq!(zero.column_dir(320, 320), None);
    }
}
