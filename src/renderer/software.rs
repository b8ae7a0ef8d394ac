//! ---------------------------------------------------------------------------
//! In-memory palette-indexed canvas
//!
//! * Holds one `ColorIndex` per pixel, row-major.
//! * `end_frame` resolves the palette into **0x00RRGGBB** and loans the
//!   converted buffer to the host (typically `window.update_with_buffer`).
//! ---------------------------------------------------------------------------

use crate::{
    renderer::{COLOR_TRANSPARENT, Canvas, ColorIndex, Font, Palette, Rgba},
    world::geometry::Rect,
};

/// Software canvas: indexed pixels, clip rectangle, font and palette.
///
/// Created once at startup and threaded through every frame.
pub struct Software {
    pixels: Vec<ColorIndex>,
    rgb: Vec<Rgba>,
    width: usize,
    height: usize,
    clip: Rect,
    palette: Palette,
    font: Font,
}

impl Software {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![COLOR_TRANSPARENT; width * height],
            rgb: vec![0; width * height],
            width,
            height,
            clip: Self::full_rect(width, height),
            palette: Palette::default(),
            font: Font::builtin(),
        }
    }

    fn full_rect(width: usize, height: usize) -> Rect {
        Rect::new(0, 0, width as i32, height as i32)
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    /// Palette index at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: usize, y: usize) -> Option<ColorIndex> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Raw indexed pixels, row-major.
    pub fn pixels(&self) -> &[ColorIndex] {
        &self.pixels
    }

    /// Resolve the palette and **loan** the finished frame to `submit`.
    pub fn end_frame<F, T>(&mut self, submit: F) -> T
    where
        F: FnOnce(&[Rgba], usize, usize) -> T,
    {
        for (dst, &src) in self.rgb.iter_mut().zip(&self.pixels) {
            *dst = self.palette.rgb(src);
        }
        submit(&self.rgb, self.width, self.height)
    }
}

/*──────────────────────── Canvas trait impl ────────────────────────*/
impl Canvas for Software {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self, color: ColorIndex) {
        self.pixels.fill(color);
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: ColorIndex) {
        if self.clip.contains(x, y) {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    fn set_clip_rect(&mut self, rect: Rect) {
        self.clip = rect.intersect(&Self::full_rect(self.width, self.height));
    }

    fn reset_clip(&mut self) {
        self.clip = Self::full_rect(self.width, self.height);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: ColorIndex) {
        let (cw, ch) = (self.font.char_w(), self.font.char_h());
        let mut pen_x = x;
        let mut pen_y = y;
        for c in text.chars() {
            if c == '\n' {
                pen_x = x;
                pen_y += ch as i32;
                continue;
            }
            for gy in 0..ch {
                for gx in 0..cw {
                    if self.font.ink(c, gx, gy) {
                        self.set_pixel(pen_x + gx as i32, pen_y + gy as i32, color);
                    }
                }
            }
            pen_x += cw as i32;
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::{COLOR_BLACK, COLOR_RED, COLOR_WHITE},
        world::texture::IndexedBitmap,
    };

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut sw = Software::new(4, 3);
        sw.clear(COLOR_BLACK);
        sw.set_pixel(-1, 0, COLOR_RED);
        sw.set_pixel(4, 0, COLOR_RED);
        sw.set_pixel(0, 3, COLOR_RED);
        assert!(sw.pixels().iter().all(|&p| p == COLOR_BLACK));
        sw.set_pixel(3, 2, COLOR_RED);
        assert_eq!(sw.pixel(3, 2), Some(COLOR_RED));
    }

    #[test]
    fn clip_rect_limits_writes() {
        let mut sw = Software::new(8, 8);
        sw.clear(COLOR_BLACK);
        sw.set_clip_rect(Rect::new(2, 2, 4, 4));
        sw.fill_rect(Rect::new(0, 0, 8, 8), COLOR_RED);
        let red = sw.pixels().iter().filter(|&&p| p == COLOR_RED).count();
        assert_eq!(red, 4);
        assert_eq!(sw.pixel(2, 2), Some(COLOR_RED));
        assert_eq!(sw.pixel(4, 4), Some(COLOR_BLACK));

        sw.reset_clip();
        sw.set_pixel(7, 7, COLOR_RED);
        assert_eq!(sw.pixel(7, 7), Some(COLOR_RED));
    }

    #[test]
    fn clear_ignores_clip() {
        let mut sw = Software::new(4, 4);
        sw.set_clip_rect(Rect::new(0, 0, 1, 1));
        sw.clear(COLOR_WHITE);
        assert!(sw.pixels().iter().all(|&p| p == COLOR_WHITE));
    }

    #[test]
    fn end_frame_resolves_palette() {
        let mut sw = Software::new(2, 1);
        sw.clear(COLOR_RED);
        sw.set_pixel(1, 0, COLOR_WHITE);
        let out = sw.end_frame(|fb, w, h| (fb.to_vec(), w, h));
        assert_eq!(out, (vec![0x00_FF0000, 0x00_FFFFFF], 2, 1));
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut sw = Software::new(10, 10);
        sw.clear(COLOR_BLACK);
        sw.draw_line(1, 8, 7, 2, COLOR_RED);
        assert_eq!(sw.pixel(1, 8), Some(COLOR_RED));
        assert_eq!(sw.pixel(7, 2), Some(COLOR_RED));
        assert_eq!(sw.pixel(4, 5), Some(COLOR_RED));
    }

    #[test]
    fn text_writes_ink() {
        let mut sw = Software::new(32, 8);
        sw.clear(COLOR_BLACK);
        sw.draw_text("10", 0, 0, COLOR_WHITE);
        // '1' stem at glyph column 1, '0' left edge at cell 4
        assert_eq!(sw.pixel(1, 0), Some(COLOR_WHITE));
        assert_eq!(sw.pixel(4, 2), Some(COLOR_WHITE));
        assert_eq!(sw.pixel(5, 2), Some(COLOR_BLACK));
    }

    #[test]
    fn installed_font_replaces_builtin() {
        // one 2×3 cell per row, so cell `n` starts at row 3n
        let cell = |c: char| (c as usize - 32) * 3;
        let mut bmp = IndexedBitmap::filled(2, cell('C') + 3, 0);
        bmp.pixels[cell('A') * 2] = 1;
        bmp.pixels[(cell('A') + 2) * 2 + 1] = 1;
        bmp.pixels[(cell('B') + 1) * 2 + 1] = 1;

        let mut sw = Software::new(8, 6);
        sw.set_font(Font::new(bmp, 2, 3));
        sw.clear(COLOR_BLACK);
        sw.draw_text("aB", 1, 1, COLOR_RED);

        let red: Vec<_> = (0..6)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| sw.pixel(x, y) == Some(COLOR_RED))
            .collect();
        // 'A' at pen x 1, 'B' advanced by the 2-pixel cell
        assert_eq!(red, vec![(1, 1), (4, 2), (2, 3)]);
    }
}
