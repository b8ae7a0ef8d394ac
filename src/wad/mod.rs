pub mod level;
pub mod loader;
pub mod raw;

pub use level::{
    LevelError, LevelLumps, LinedefFlags, RawLevel, RawLinedef, RawSector, RawSidedef, RawVertex,
};
pub use loader::{
    LoadError, WAD_UNITS_PER_WORLD_UNIT, build_map, load_from_wad, load_map, load_map_file,
    surface_color,
};
pub use raw::{DIR_ENTRY_SIZE, HEADER_SIZE, LumpInfo, LumpRecord, Wad, WadError};
