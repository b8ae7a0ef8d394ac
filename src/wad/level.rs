use crate::wad::{LumpRecord, Wad, WadError};
use bincode::Decode;
use bitflags::bitflags;
use log::{debug, warn};
use std::ops::Range;

/*=======================================================================*/
/*                         Raw binary structs                            */
/*=======================================================================*/

#[derive(Clone, Copy, Decode, Debug, PartialEq, Eq)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq, Eq)]
pub struct RawLinedef {
    pub v1: i16,
    pub v2: i16,
    pub flags: i16,
    pub special: i16,
    pub tag: i16,
    /// Right-hand sidedef, `-1` = none.
    pub front: i16,
    /// Left-hand sidedef, `-1` = none (one-sided wall).
    pub back: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq, Eq)]
pub struct RawSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub upper_tex: [u8; 8],
    pub lower_tex: [u8; 8],
    pub middle_tex: [u8; 8],
    pub sector: i16,
}

#[derive(Clone, Copy, Decode, Debug, PartialEq, Eq)]
pub struct RawSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: [u8; 8],
    pub ceil_tex: [u8; 8],
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

impl LumpRecord for RawVertex {
    const LUMP: &'static str = "VERTEXES";
    const SIZE: usize = 4;
}

impl LumpRecord for RawLinedef {
    const LUMP: &'static str = "LINEDEFS";
    const SIZE: usize = 14;
}

impl LumpRecord for RawSidedef {
    const LUMP: &'static str = "SIDEDEFS";
    const SIZE: usize = 30;
}

impl LumpRecord for RawSector {
    const LUMP: &'static str = "SECTORS";
    const SIZE: usize = 26;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0008;
        const LOWER_UNPEGGED  = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const NOT_ON_MAP      = 0x0080;
        const ALREADY_ON_MAP  = 0x0100;
    }
}

impl RawLinedef {
    pub fn flags(&self) -> LinedefFlags {
        LinedefFlags::from_bits_truncate(self.flags as u16)
    }

    pub fn front_side(&self) -> Option<usize> {
        (self.front >= 0).then_some(self.front as usize)
    }

    pub fn back_side(&self) -> Option<usize> {
        (self.back >= 0).then_some(self.back as usize)
    }
}

impl RawSidedef {
    /// Wall texture to show: middle, else upper, else lower; `None` if all
    /// three are empty (`-`).
    pub fn surface_name(&self) -> Option<&str> {
        [&self.middle_tex, &self.upper_tex, &self.lower_tex]
            .into_iter()
            .map(Wad::lump_name_str)
            .find(|n| !n.is_empty() && *n != "-")
    }
}

/*=======================================================================*/
/*                     Aggregate returned by `parse_level`               */
/*=======================================================================*/

/// The four map lumps, each `None` until a well-formed copy was found.
#[derive(Debug, Default)]
pub struct LevelLumps {
    pub vertices: Option<Vec<RawVertex>>,
    pub linedefs: Option<Vec<RawLinedef>>,
    pub sidedefs: Option<Vec<RawSidedef>>,
    pub sectors: Option<Vec<RawSector>>,
}

#[derive(Debug)]
pub struct RawLevel {
    pub name: String,
    pub vertices: Vec<RawVertex>,
    pub linedefs: Vec<RawLinedef>,
    pub sidedefs: Vec<RawSidedef>,
    pub sectors: Vec<RawSector>,
}

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("map marker `{0}` not found")]
    UnknownMap(String),

    #[error("required lump `{0}` missing or unreadable")]
    Missing(&'static str),

    #[error(transparent)]
    Wad(#[from] WadError),
}

/*=======================================================================*/
/*                     Convenience helpers on `Wad`                      */
/*=======================================================================*/
impl Wad {
    /// Directory range holding the lumps of map `marker`.
    ///
    /// * `Some(name)`: lumps after that marker up to the next marker.
    /// * `None`: the first map, or the whole directory if there are no
    ///   markers at all.
    pub fn level_range(&self, marker: Option<&str>) -> Result<(String, Range<usize>), LevelError> {
        let markers = self.level_markers();
        let pos = match marker {
            Some(name) => Some(
                markers
                    .iter()
                    .position(|&i| self.name_of(i).eq_ignore_ascii_case(name))
                    .ok_or_else(|| LevelError::UnknownMap(name.to_owned()))?,
            ),
            None => (!markers.is_empty()).then_some(0),
        };

        Ok(match pos {
            Some(p) => {
                let start = markers[p];
                let end = markers.get(p + 1).copied().unwrap_or(self.lumps().len());
                (self.name_of(start).to_owned(), start + 1..end)
            }
            None => ("MAP".to_owned(), 0..self.lumps().len()),
        })
    }

    /// Decode every recognised map lump inside `range`.
    ///
    /// A lump that cannot be decoded (bad length, data past EOF) is logged
    /// and skipped; a later well-formed copy still wins.
    pub fn resolve_lumps(&self, range: Range<usize>) -> LevelLumps {
        let mut out = LevelLumps::default();
        for idx in range {
            let name = self.name_of(idx);
            debug!("lump #{idx} {name}");
            match name {
                n if n == RawVertex::LUMP => self.take(idx, &mut out.vertices),
                n if n == RawLinedef::LUMP => self.take(idx, &mut out.linedefs),
                n if n == RawSidedef::LUMP => self.take(idx, &mut out.sidedefs),
                n if n == RawSector::LUMP => self.take(idx, &mut out.sectors),
                _ => {}
            }
        }
        out
    }

    fn take<T: LumpRecord>(&self, idx: usize, slot: &mut Option<Vec<T>>) {
        match self.lump_to_vec::<T>(idx) {
            Ok(v) => {
                debug!("  got {} {}", v.len(), T::LUMP);
                *slot = Some(v);
            }
            Err(e) => warn!("skipping lump: {e}"),
        }
    }

    /// Decode the four lumps that make up a map.
    pub fn parse_level(&self, marker: Option<&str>) -> Result<RawLevel, LevelError> {
        let (name, range) = self.level_range(marker)?;
        let lumps = self.resolve_lumps(range);

        Ok(RawLevel {
            name,
            vertices: lumps.vertices.ok_or(LevelError::Missing(RawVertex::LUMP))?,
            linedefs: lumps.linedefs.ok_or(LevelError::Missing(RawLinedef::LUMP))?,
            sidedefs: lumps.sidedefs.ok_or(LevelError::Missing(RawSidedef::LUMP))?,
            sectors: lumps.sectors.ok_or(LevelError::Missing(RawSector::LUMP))?,
        })
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::wad::{DIR_ENTRY_SIZE, fixtures};

    #[test]
    fn quad_parses() {
        let wad = Wad::from_bytes(fixtures::quad_wad()).unwrap();
        let lvl = wad.parse_level(None).expect("level decode");
        assert_eq!(lvl.name, "MAP");
        assert_eq!(lvl.vertices.len(), 4);
        assert_eq!(lvl.linedefs.len(), 4);
        assert_eq!(lvl.sidedefs.len(), 4);
        assert_eq!(lvl.sectors.len(), 1);
        assert_eq!(lvl.vertices[2], RawVertex { x: 64, y: 0 });
        assert_eq!(lvl.sectors[0].ceil_h, 128);
        assert_eq!(lvl.sidedefs[0].surface_name(), Some("STARTAN3"));
    }

    #[test]
    fn misaligned_vertexes_is_skipped() {
        let mut lumps = fixtures::quad_lumps();
        lumps[0].1.push(0); // VERTEXES: 17 bytes
        let wad = Wad::from_bytes(fixtures::assemble(&lumps)).unwrap();

        let resolved = wad.resolve_lumps(0..wad.lumps().len());
        assert!(resolved.vertices.is_none());
        assert_eq!(resolved.linedefs.map(|v| v.len()), Some(4));
        assert_eq!(resolved.sidedefs.map(|v| v.len()), Some(4));
        assert_eq!(resolved.sectors.map(|v| v.len()), Some(1));

        let err = wad.parse_level(None).unwrap_err();
        assert!(matches!(err, LevelError::Missing("VERTEXES")));
    }

    #[test]
    fn lump_past_eof_is_skipped() {
        let mut bytes = fixtures::quad_wad();
        // LINEDEFS is directory entry 1; point its data past the end
        let entry = bytes.len() - 3 * DIR_ENTRY_SIZE;
        bytes[entry..entry + 4].copy_from_slice(&1_000_000i32.to_le_bytes());
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.name_of(1), "LINEDEFS");

        let resolved = wad.resolve_lumps(0..wad.lumps().len());
        assert!(resolved.linedefs.is_none());
        assert_eq!(resolved.vertices.map(|v| v.len()), Some(4));
        assert_eq!(resolved.sidedefs.map(|v| v.len()), Some(4));
        assert_eq!(resolved.sectors.map(|v| v.len()), Some(1));

        assert!(matches!(
            wad.parse_level(None),
            Err(LevelError::Missing("LINEDEFS"))
        ));
    }

    #[test]
    fn later_good_copy_replaces_skipped_lump() {
        let mut lumps = fixtures::quad_lumps();
        let good = lumps[0].1.clone();
        lumps[0].1.truncate(6);
        lumps.push(("VERTEXES", good));
        let wad = Wad::from_bytes(fixtures::assemble(&lumps)).unwrap();
        assert_eq!(wad.parse_level(None).unwrap().vertices.len(), 4);
    }

    #[test]
    fn missing_sectors_guard() {
        let lumps: Vec<_> = fixtures::quad_lumps()
            .into_iter()
            .filter(|(n, _)| *n != "SECTORS")
            .collect();
        let wad = Wad::from_bytes(fixtures::assemble(&lumps)).unwrap();
        let err = wad.parse_level(None).unwrap_err();
        assert!(matches!(err, LevelError::Missing("SECTORS")));
    }

    #[test]
    fn marker_ranges() {
        let mut lumps = vec![("E1M1", vec![])];
        lumps.extend(fixtures::quad_lumps());
        lumps.push(("E1M2", vec![]));
        lumps.push(("THINGS", vec![0; 10]));
        let wad = Wad::from_bytes(fixtures::assemble(&lumps)).unwrap();

        let (name, range) = wad.level_range(None).unwrap();
        assert_eq!((name.as_str(), range), ("E1M1", 1..5));
        let (name, range) = wad.level_range(Some("e1m2")).unwrap();
        assert_eq!((name.as_str(), range), ("E1M2", 6..7));
        assert!(matches!(
            wad.level_range(Some("MAP01")),
            Err(LevelError::UnknownMap(_))
        ));

        // E1M2 has no geometry of its own
        assert!(matches!(
            wad.parse_level(Some("E1M2")),
            Err(LevelError::Missing(_))
        ));
        assert_eq!(wad.parse_level(Some("E1M1")).unwrap().name, "E1M1");
    }

    #[test]
    fn empty_texture_names_fall_back() {
        let mut side = fixtures::sidedef(0, "-");
        assert_eq!(side.surface_name(), None);
        side.upper_tex = *b"BROWN1\0\0";
        assert_eq!(side.surface_name(), Some("BROWN1"));
    }

    #[test]
    fn linedef_flags() {
        let one = fixtures::linedef(0, 1, 0, -1);
        assert!(one.flags().contains(LinedefFlags::IMPASSABLE));
        let two = fixtures::linedef(0, 1, 0, 1);
        assert!(two.flags().contains(LinedefFlags::TWO_SIDED));
        assert!(!two.flags().contains(LinedefFlags::IMPASSABLE));
    }
}
