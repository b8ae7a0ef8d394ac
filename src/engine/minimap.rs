//! Top-down overlay in the bottom-left corner.
//!
//! Walls are placed through the same view transform the raycaster uses, so
//! the map turns with the player and "ahead" is always up.

use glam::Vec2;

use crate::{
    renderer::{COLOR_BLACK, COLOR_GRAY, Canvas},
    world::{camera::View, geometry::Rect, map::Map},
};

/// Player arrow, as offsets from the minimap centre (y down).
const MARKER: [(i32, i32); 9] = [
    (0, 0),
    (0, -1),
    (0, -2),
    (0, -3),
    (0, -4),
    (-1, -3),
    (1, -3),
    (2, -2),
    (-2, -2),
];

/// Draw the minimap: gray backdrop, wall edges, vertex dots, player arrow.
///
/// `size` is the side of the square in pixels, `zoom` the pixels per
/// world unit.  Leaves the clip rectangle reset.
pub fn draw_minimap(canvas: &mut impl Canvas, map: &Map, view: &View, size: i32, zoom: f32) {
    let canvas_h = canvas.height() as i32;
    let rect = Rect::new(0, canvas_h - size, size, canvas_h);
    let (cx, cy) = (size / 2, canvas_h - size / 2);

    let to_screen = |p: Vec2| -> Option<(i32, i32)> {
        let v = view.to_view_space(p).ok()?;
        Some((
            (cx as f32 + v.x * zoom) as i32,
            (cy as f32 - v.y * zoom) as i32,
        ))
    };

    canvas.set_clip_rect(rect);
    canvas.fill_rect(rect, COLOR_GRAY);

    for id in 0..map.sectors().len() {
        for edge in map.edges(id as u16) {
            if let (Some(a), Some(b)) = (to_screen(edge.p1), to_screen(edge.p2)) {
                canvas.draw_line(a.0, a.1, b.0, b.1, edge.wall.color);
            }
        }
    }
    for wall in map.walls() {
        if let Some((x, y)) = to_screen(wall.pos) {
            if rect.contains(x, y) {
                canvas.set_pixel(x, y, wall.color);
            }
        }
    }
    for (dx, dy) in MARKER {
        canvas.set_pixel(cx + dx, cy + dy, COLOR_BLACK);
    }

    canvas.reset_clip();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::{COLOR_BLUE, COLOR_WHITE, Software},
        world::camera::{DEFAULT_FOV_SCALE, Player},
    };

    fn frame() -> Software {
        let mut canvas = Software::new(160, 120);
        canvas.clear(COLOR_WHITE);
        let view = Player::new(Vec2::ZERO, Vec2::Y, DEFAULT_FOV_SCALE).view();
        draw_minimap(&mut canvas, &Map::sample_room(), &view, 100, 5.0);
        canvas
    }

    #[test]
    fn stays_inside_its_rect() {
        let canvas = frame();
        for y in 0..120 {
            for x in 0..160 {
                let inside = x < 100 && y >= 20;
                let c = canvas.pixel(x, y).unwrap();
                assert_eq!(c != COLOR_WHITE, inside, "({x},{y})");
            }
        }
    }

    #[test]
    fn marker_and_walls() {
        let canvas = frame();
        for (dx, dy) in MARKER {
            let (x, y) = ((50 + dx) as usize, (70 + dy) as usize);
            assert_eq!(canvas.pixel(x, y), Some(COLOR_BLACK));
        }
        // wall 2 (blue) is straight ahead, 4 units up: a horizontal run
        // around row 50
        let blue = (0..100)
            .flat_map(|x| (20..120).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some(COLOR_BLUE))
            .count();
        assert!(blue > 10);
        assert_eq!(canvas.pixel(50, 22), Some(COLOR_GRAY));
    }

    #[test]
    fn degenerate_view_only_draws_backdrop() {
        let mut canvas = Software::new(160, 120);
        canvas.clear(COLOR_WHITE);
        let view = View::new(Vec2::ZERO, Vec2::Y, Vec2::Y);
        draw_minimap(&mut canvas, &Map::sample_room(), &view, 100, 5.0);
        assert_eq!(canvas.pixel(10, 30), Some(COLOR_GRAY));
        assert_eq!(canvas.pixel(50, 70), Some(COLOR_BLACK));
        // clip was reset
        canvas.set_pixel(150, 5, COLOR_BLUE);
        assert_eq!(canvas.pixel(150, 5), Some(COLOR_BLUE));
    }
}
