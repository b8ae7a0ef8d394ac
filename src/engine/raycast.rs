//! Per-column raycaster.
//!
//! One ray per screen column, tested against every front-facing wall of the
//! current sector.  The nearest hit (by depth along the facing axis, which
//! removes the fisheye bend) becomes a textured vertical strip centred on
//! the horizontal midline.

use glam::Vec2;

use crate::{
    engine::intersect::line_ray_intersect,
    renderer::Canvas,
    world::{
        camera::View,
        map::{Map, SectorId},
        texture::{IndexedBitmap, TextureBank},
    },
};

/// Nearest wall found by [`cast_column`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnHit {
    /// Global wall index.
    pub wall: usize,
    /// Distance along the facing axis.
    pub depth: f32,
    /// Hit position along the wall, 0 at its start vertex.
    pub line_dist: f32,
}

/// A wall at depth 1 spans twice the canvas height.
const PROJECTION_SCALE: f32 = 2.0;

/// Nearest wall of `sector` hit by the ray `origin + t * ray_dir`.
///
/// Only walls whose inside faces `origin` (`perp_dot(origin - p1, p2 - p1) > 0`)
/// are candidates.  Ties keep the lowest wall index.
pub fn cast_column(
    map: &Map,
    sector: SectorId,
    origin: Vec2,
    facing: Vec2,
    ray_dir: Vec2,
) -> Option<ColumnHit> {
    let mut best: Option<ColumnHit> = None;

    for edge in map.edges(sector) {
        if (origin - edge.p1).perp_dot(edge.p2 - edge.p1) <= 0.0 {
            continue;
        }
        let Some(hit) = line_ray_intersect(origin, ray_dir, edge.p1, edge.p2) else {
            continue;
        };

        let depth = facing.dot(ray_dir * hit.ray_dist);
        if depth > 0.0 && depth.is_finite() && best.is_none_or(|b| depth < b.depth) {
            best = Some(ColumnHit {
                wall: edge.index,
                depth,
                line_dist: hit.line_dist,
            });
        }
    }
    best
}

/// On-screen height, in pixels, of a wall at `depth`.
#[inline]
pub fn projected_height(depth: f32, canvas_h: usize) -> f32 {
    (1.0 / depth) * canvas_h as f32 * PROJECTION_SCALE
}

/// Paint the strip for `hit` into column `x`.
///
/// Only rows that land on the canvas are visited, so a wall right in front
/// of the camera costs no more than one screen height.
pub fn draw_column(canvas: &mut impl Canvas, x: i32, hit: &ColumnHit, tex: &IndexedBitmap) {
    let canvas_h = canvas.height() as i32;
    let height_f = projected_height(hit.depth, canvas.height());
    let height = height_f as i32;
    if height <= 0 {
        return;
    }
    let start = canvas_h / 2 - height / 2;

    let tex_x = (hit.line_dist * tex.w as f32) as i32;
    let first = (-start).max(0);
    let last = height.min(canvas_h - start);

    for y in first..last {
        let tex_y = ((y as f32 / height_f) * tex.h as f32) as i32;
        canvas.set_pixel(x, start + y, tex.sample(tex_x, tex_y));
    }
}

/// Cast and draw every column of the frame.
///
/// `depths[x]` receives the hit depth of column `x`, or `None` when the
/// column saw no wall.
pub fn render_columns(
    canvas: &mut impl Canvas,
    map: &Map,
    sector: SectorId,
    view: &View,
    textures: &TextureBank,
    depths: &mut Vec<Option<f32>>,
) {
    let width = canvas.width();
    depths.clear();
    depths.resize(width, None);

    for (x, depth) in depths.iter_mut().enumerate() {
        let Some(ray_dir) = view.column_dir(x, width) else {
            continue;
        };
        let Some(hit) = cast_column(map, sector, view.pos, view.dir, ray_dir) else {
            continue;
        };
        *depth = Some(hit.depth);

        let tex = textures.texture_or_missing(map.walls()[hit.wall].texture);
        draw_column(canvas, x as i32, &hit, tex);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
