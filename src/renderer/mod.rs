//! Drawing abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! The raycaster, the minimap and the HUD write palette indices through the
//! [`Canvas`] trait; the host decides how the finished frame reaches the
//! screen.
//!
//! * [`software::Software`] is the in-memory implementation used by the
//!   viewer and by the tests.
//! * Palette index 0 is transparent, 1‥7 are the fixed colours below.

use crate::world::geometry::Rect;

/// Pixel format handed to the host (0x00RRGGBB).
pub type Rgba = u32;

/// Palette index stored in the canvas and in textures.
pub type ColorIndex = u8;

pub const COLOR_TRANSPARENT: ColorIndex = 0;
pub const COLOR_BLACK: ColorIndex = 1;
pub const COLOR_WHITE: ColorIndex = 2;
pub const COLOR_GRAY: ColorIndex = 3;
pub const COLOR_RED: ColorIndex = 4;
pub const COLOR_BLUE: ColorIndex = 5;
pub const COLOR_GREEN: ColorIndex = 6;
pub const COLOR_YELLOW: ColorIndex = 7;

pub const PALETTE_LEN: usize = 8;

/// The fixed 8-entry palette as `(r, g, b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette(pub [[u8; 4]; PALETTE_LEN]);

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [[0u8; 4]; PALETTE_LEN];
        colors[COLOR_TRANSPARENT as usize] = [0x00, 0x00, 0x00, 0x00];
        colors[COLOR_BLACK as usize] = [0x00, 0x00, 0x00, 0xff];
        colors[COLOR_WHITE as usize] = [0xff, 0xff, 0xff, 0xff];
        colors[COLOR_GRAY as usize] = [0xaa, 0xaa, 0xaa, 0xff];
        colors[COLOR_RED as usize] = [0xff, 0x00, 0x00, 0xff];
        colors[COLOR_BLUE as usize] = [0x00, 0x00, 0xff, 0xff];
        colors[COLOR_GREEN as usize] = [0x00, 0xff, 0x00, 0xff];
        colors[COLOR_YELLOW as usize] = [0xff, 0xff, 0x00, 0xff];
        Palette(colors)
    }
}

impl Palette {
    /// Host pixel for `idx`; out-of-range indices map to black.
    #[inline]
    pub fn rgb(&self, idx: ColorIndex) -> Rgba {
        let [r, g, b, _] = self.0.get(idx as usize).copied().unwrap_or([0; 4]);
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }
}

/// Fixed-size palette-indexed drawing surface.
///
/// Writes outside the surface or the active clip rectangle are dropped.
pub trait Canvas {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Fill the whole surface, ignoring the clip rectangle.
    fn clear(&mut self, color: ColorIndex);

    fn set_pixel(&mut self, x: i32, y: i32, color: ColorIndex);

    fn set_clip_rect(&mut self, rect: Rect);

    fn reset_clip(&mut self);

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: ColorIndex);

    /// Fill `rect` (clipped).
    fn fill_rect(&mut self, rect: Rect, color: ColorIndex) {
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Integer Bresenham line-drawing algorithm.
    fn draw_line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, color: ColorIndex) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x0 == x1 {
                    break;
                }
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                if y0 == y1 {
                    break;
                }
                err += dx;
                y0 += sy;
            }
        }
    }
}

pub mod font;
pub mod software;

pub use font::Font;
pub use software::Software;
