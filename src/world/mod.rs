pub mod camera;
pub mod geometry;
pub mod map;
pub mod texture;

pub use camera::{DEFAULT_FOV_SCALE, Player, TransformError, View};
pub use geometry::{EPSILON, Rect, VecExt};
pub use map::{MAX_SECTORS, MAX_WALLS, Map, MapBuilder, MapError, Sector, SectorId, Wall, WallEdge};
pub use texture::{IndexedBitmap, NO_TEXTURE, TextureBank, TextureError, TextureId};
