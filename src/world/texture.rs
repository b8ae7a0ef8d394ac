// Format-agnostic repository of indexed bitmaps used as wall textures.
// The map and the raycaster interact through `TextureId` only.

use std::collections::HashMap;

use crate::renderer::{COLOR_GRAY, COLOR_WHITE, ColorIndex};

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Palette-indexed image in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedBitmap {
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<ColorIndex>,
}

impl IndexedBitmap {
    /// Bitmap of `w`×`h` pixels, all set to `fill`.
    pub fn filled(w: usize, h: usize, fill: ColorIndex) -> Self {
        Self {
            w,
            h,
            pixels: vec![fill; w * h],
        }
    }

    /// Texel lookup with both coordinates clamped into `[0, dim)`.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> ColorIndex {
        if self.w == 0 || self.h == 0 {
            return 0;
        }
        let x = x.clamp(0, self.w as i32 - 1) as usize;
        let y = y.clamp(0, self.h as i32 - 1) as usize;
        self.pixels.get(y * self.w + x).copied().unwrap_or(0)
    }

    /// 8×8 checkerboard of 8-pixel cells (64×64 texels).
    pub fn checker() -> Self {
        const CELLS: usize = 8;
        const CELL: usize = 8;
        let side = CELLS * CELL;
        let mut pix = vec![0; side * side];
        for y in 0..side {
            for x in 0..side {
                pix[y * side + x] = if ((x / CELL) ^ (y / CELL)) & 1 == 0 {
                    COLOR_WHITE
                } else {
                    COLOR_GRAY
                };
            }
        }
        Self {
            w: side,
            h: side,
            pixels: pix,
        }
    }
}

impl Default for IndexedBitmap {
    fn default() -> Self {
        Self::checker()
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Bank already holds `TextureId::MAX` entries.
    #[error("texture bank full")]
    Full,
}

/// Name → bitmap cache.
///
/// * Does **not** decode images; the host hands over ready bitmaps.
/// * ID **0** is always the “missing” checkerboard.
/// * Names are stored upper-case, lookups are case-insensitive.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<IndexedBitmap>,
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::default_with_checker()
    }
}

impl TextureBank {
    /// Create a bank whose fallback (id 0, name `"MISSING"`) is `missing_tex`.
    pub fn new(missing_tex: IndexedBitmap) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(IndexedBitmap::checker())
    }

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(&name.to_ascii_uppercase()).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&IndexedBitmap, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow a texture, falling back to the checkerboard for bad ids.
    pub fn texture_or_missing(&self, id: TextureId) -> &IndexedBitmap {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    /// Insert a bitmap under `name`; fails on duplicates.
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: IndexedBitmap,
    ) -> Result<TextureId, TextureError> {
        let name = name.into().to_ascii_uppercase();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = TextureId::try_from(self.data.len()).map_err(|_| TextureError::Full)?;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
