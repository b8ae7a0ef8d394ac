//! Fixed-cell bitmap fonts.
//!
//! A font bitmap holds glyph cells of `char_w`×`char_h` pixels laid out
//! left-to-right, top-to-bottom in ASCII order starting at `' '` (32).
//! Any non-transparent texel is ink.

use crate::world::texture::IndexedBitmap;

const FIRST_CHAR: u32 = 32;

pub struct Font {
    bitmap: IndexedBitmap,
    char_w: usize,
    char_h: usize,
}

impl Font {
    pub fn new(bitmap: IndexedBitmap, char_w: usize, char_h: usize) -> Self {
        Self {
            bitmap,
            char_w: char_w.max(1),
            char_h: char_h.max(1),
        }
    }

    /// 3×5 glyphs (4×6 cells) for digits, `A`-`Z` and a little punctuation.
    pub fn builtin() -> Self {
        const CW: usize = 4;
        const CH: usize = 6;
        const COLS: usize = 16;
        const ROWS: usize = 4; // ' ' .. '_'
        let mut bmp = IndexedBitmap::filled(COLS * CW, ROWS * CH, 0);
        for &(c, rows) in GLYPHS {
            let cell = (c as usize) - FIRST_CHAR as usize;
            let (cx, cy) = ((cell % COLS) * CW, (cell / COLS) * CH);
            for (gy, bits) in rows.iter().enumerate() {
                for gx in 0..3 {
                    if bits & (0b100 >> gx) != 0 {
                        bmp.pixels[(cy + gy) * bmp.w + cx + gx] = 1;
                    }
                }
            }
        }
        Self::new(bmp, CW, CH)
    }

    pub fn char_w(&self) -> usize {
        self.char_w
    }

    pub fn char_h(&self) -> usize {
        self.char_h
    }

    /// True if glyph `c` has ink at cell-local `(gx, gy)`.
    pub fn ink(&self, c: char, gx: usize, gy: usize) -> bool {
        let c = c.to_ascii_uppercase() as u32;
        if c < FIRST_CHAR || gx >= self.char_w || gy >= self.char_h {
            return false;
        }
        let cols = self.bitmap.w / self.char_w;
        if cols == 0 {
            return false;
        }
        let cell = (c - FIRST_CHAR) as usize;
        let (cx, cy) = ((cell % cols) * self.char_w, (cell / cols) * self.char_h);
        let (x, y) = (cx + gx, cy + gy);
        if y >= self.bitmap.h {
            return false;
        }
        self.bitmap
            .pixels
            .get(y * self.bitmap.w + x)
            .is_some_and(|&p| p != 0)
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::builtin()
    }
}

#[rustfmt::skip]
const GLYPHS: &[(char, [u8; 5])] = &[
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b011, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
];
